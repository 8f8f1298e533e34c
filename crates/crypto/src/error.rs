//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
///
/// Durchreichen auf einem Kontext ohne Schluessel ist kein Fehler und taucht
/// hier deshalb nicht auf.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Schluessel-Generierung fehlgeschlagen: {0}")]
    SchluesselGenerierung(String),

    #[error("Peer-Schluessel konnte nicht importiert werden: {0}")]
    SchluesselImport(String),

    #[error("Key Derivation fehlgeschlagen: {0}")]
    KeyDerivation(String),

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Signatur-Verifikation fehlgeschlagen: {0}")]
    SignaturVerifikation(String),

    #[error("Frame-Zaehler erschoepft (Limit {limit}), Sitzung muss neu aufgebaut werden")]
    ZaehlerErschoepft { limit: u32 },

    #[error("Endpunkt unterstuetzt keine Frame-Transforms")]
    TransformNichtUnterstuetzt,

    #[error("Endpunkt hat bereits einen Frame-Transform")]
    TransformBereitsGebunden,

    #[error("Pipeline-Fehler: {0}")]
    Pipeline(String),

    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
