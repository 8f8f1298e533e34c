//! Konfiguration eines E2EE-Kontexts
//!
//! Alle Felder haben Standardwerte, die dem Verhalten ohne Konfiguration
//! entsprechen (ein Schluessel fuer beide Richtungen, fehlgeschlagene Frames
//! werden durchgereicht).

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Fester HKDF-Info-String fuer den Frame-Schluessel
pub const DEFAULT_HKDF_INFO: &str = "mediacrypt-frame-key-v1";

/// Wie aus dem Shared Secret die Frame-Schluessel abgeleitet werden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchluesselModus {
    /// Ein Schluessel fuer beide Richtungen
    #[default]
    Symmetrisch,
    /// Getrennte Sende- und Empfangsschluessel; die oeffentlichen Schluessel
    /// beider Seiten fliessen in den HKDF-Info-String ein
    Richtungsgebunden,
}

/// Was mit einem Frame passiert, dessen Entschluesselung fehlschlaegt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FehlerPolitik {
    /// Originale Bytes unveraendert weitergeben
    #[default]
    Durchreichen,
    /// Frame im Decryption-Transform verwerfen
    Verwerfen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eeConfig {
    pub schluessel_modus: SchluesselModus,
    pub fehler_politik: FehlerPolitik,
    /// Ab diesem Zaehlerstand verweigert `encrypt_frame` weitere Frames
    pub zaehler_limit: u32,
    /// Kontext-Label fuer HKDF; beide Seiten muessen denselben Wert nutzen
    pub hkdf_info: String,
}

impl Default for E2eeConfig {
    fn default() -> Self {
        Self {
            schluessel_modus: SchluesselModus::default(),
            fehler_politik: FehlerPolitik::default(),
            zaehler_limit: u32::MAX,
            hkdf_info: DEFAULT_HKDF_INFO.into(),
        }
    }
}

impl E2eeConfig {
    pub fn validieren(&self) -> CryptoResult<()> {
        if self.hkdf_info.is_empty() {
            return Err(CryptoError::Konfiguration(
                "hkdf_info darf nicht leer sein".into(),
            ));
        }
        if self.zaehler_limit == 0 {
            return Err(CryptoError::Konfiguration(
                "zaehler_limit muss groesser als 0 sein".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = E2eeConfig::default();
        assert!(cfg.validieren().is_ok());
        assert_eq!(cfg.schluessel_modus, SchluesselModus::Symmetrisch);
        assert_eq!(cfg.fehler_politik, FehlerPolitik::Durchreichen);
        assert_eq!(cfg.zaehler_limit, u32::MAX);
        assert_eq!(cfg.hkdf_info, DEFAULT_HKDF_INFO);
    }

    #[test]
    fn leeres_info_wird_abgelehnt() {
        let cfg = E2eeConfig {
            hkdf_info: String::new(),
            ..E2eeConfig::default()
        };
        assert!(matches!(cfg.validieren(), Err(CryptoError::Konfiguration(_))));
    }

    #[test]
    fn zaehler_limit_null_wird_abgelehnt() {
        let cfg = E2eeConfig {
            zaehler_limit: 0,
            ..E2eeConfig::default()
        };
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn enums_als_snake_case() {
        let json = serde_json::to_string(&SchluesselModus::Richtungsgebunden).unwrap();
        assert_eq!(json, "\"richtungsgebunden\"");
        let politik: FehlerPolitik = serde_json::from_str("\"verwerfen\"").unwrap();
        assert_eq!(politik, FehlerPolitik::Verwerfen);
    }

    #[test]
    fn fehlende_felder_behalten_standardwerte() {
        let cfg: E2eeConfig =
            serde_json::from_str(r#"{"fehler_politik": "verwerfen"}"#).unwrap();
        assert_eq!(cfg.fehler_politik, FehlerPolitik::Verwerfen);
        assert_eq!(cfg.hkdf_info, DEFAULT_HKDF_INFO);
    }
}
