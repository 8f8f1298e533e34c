//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `MC_LOG_LEVEL`: Log-Level bzw. Filter-Direktive, Standard: info
//! - `MC_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Umgebungsvariablen haben Vorrang vor den Werten aus der Konfiguration.

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "MC_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "MC_LOG_FORMAT";

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialisiert das Logging-System.
///
/// Liest `MC_LOG_LEVEL` und `MC_LOG_FORMAT` aus der Umgebung und faellt
/// auf `level` / `format` zurueck. Ein zweiter Aufruf ist wirkungslos.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_env = std::env::var(ENV_LOG_FORMAT).ok();

    // Bereits gesetzter globaler Subscriber (z.B. in Tests) wird beibehalten
    let _ = match format_waehlen(format_env.as_deref(), format) {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
}

/// Waehlt das Format: Umgebung vor Konfiguration, Unbekanntes wird Text
pub fn format_waehlen(aus_env: Option<&str>, aus_config: &str) -> LogFormat {
    match aus_env.unwrap_or(aus_config) {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_gueltige_werte() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(log_level_gueltig(level), "{level}");
        }
    }

    #[test]
    fn log_level_ungueltige_werte() {
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO")); // Gross-/Kleinschreibung
        assert!(!log_level_gueltig(""));
    }

    #[test]
    fn log_format_gueltige_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }

    #[test]
    fn format_umgebung_hat_vorrang() {
        assert_eq!(format_waehlen(Some("json"), "text"), LogFormat::Json);
        assert_eq!(format_waehlen(Some("text"), "json"), LogFormat::Text);
    }

    #[test]
    fn format_aus_config_ohne_umgebung() {
        assert_eq!(format_waehlen(None, "json"), LogFormat::Json);
        assert_eq!(format_waehlen(None, "text"), LogFormat::Text);
    }

    #[test]
    fn unbekanntes_format_wird_text() {
        assert_eq!(format_waehlen(None, "xml"), LogFormat::Text);
    }

    #[test]
    fn doppelte_initialisierung_panikt_nicht() {
        logging_initialisieren("debug", "text");
        logging_initialisieren("info", "json");
    }
}
