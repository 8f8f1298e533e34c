//! Demo-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass die Demo ohne Konfigurationsdatei laeuft.

use mediacrypt_crypto::E2eeConfig;
use mediacrypt_observability::logging::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Vollstaendige Demo-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Einstellungen beider E2EE-Kontexte
    pub e2ee: E2eeConfig,
    /// Umfang des Demo-Laufs
    pub demo: DemoEinstellungen,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoEinstellungen {
    /// Frames pro Richtung
    pub frames: u32,
    /// Payload-Groesse eines Frames in Bytes
    pub frame_groesse: usize,
    /// Puffer der In-Memory-Pipes
    pub kanal_kapazitaet: usize,
}

impl Default for DemoEinstellungen {
    fn default() -> Self {
        Self {
            frames: 100,
            frame_groesse: 960,
            kanal_kapazitaet: 16,
        }
    }
}

impl DemoConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.validieren()?;
        Ok(config)
    }

    pub fn validieren(&self) -> anyhow::Result<()> {
        self.e2ee.validieren()?;
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("unbekanntes logging.level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("unbekanntes logging.format '{}'", self.logging.format);
        }
        if self.demo.kanal_kapazitaet == 0 {
            anyhow::bail!("demo.kanal_kapazitaet muss groesser als 0 sein");
        }
        Ok(())
    }
}
