//! mediacrypt Demo – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und laesst zwei
//! Peers verschluesselte Frames austauschen.

use anyhow::Result;
use mediacrypt_demo::{config::DemoConfig, Demo};
use mediacrypt_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("MEDIACRYPT_CONFIG").unwrap_or_else(|_| "mediacrypt.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = DemoConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "mediacrypt Demo wird initialisiert"
    );

    let bericht = Demo::neu(config).starten().await?;

    if !bericht.fehlerfrei() {
        anyhow::bail!(
            "{} von {} Frames kamen nicht unveraendert an",
            bericht.frames_gesendet - bericht.frames_korrekt,
            bericht.frames_gesendet
        );
    }

    println!("{}", serde_json::to_string_pretty(&bericht)?);
    Ok(())
}
