//! Gemeinsame Typen fuer das Kryptografie-Subsystem
//!
//! ## Wire-Format eines verschluesselten Frames
//! ```text
//! [zaehler(4, LE)] [nonce(12)] [ciphertext + auth_tag(16)]
//! ```
//!
//! ## Nonce-Aufbau
//! ```text
//! [zaehler(4, LE)] [random(8)]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Laenge eines AES-256-GCM Schluessels
pub const KEY_LEN: usize = 32;
/// Laenge der AEAD-Nonce
pub const NONCE_LEN: usize = 12;
/// Laenge des Zaehler-Felds im Frame-Header
pub const ZAEHLER_LEN: usize = 4;
/// Zaehler + Nonce
pub const HEADER_LEN: usize = ZAEHLER_LEN + NONCE_LEN;
/// Laenge des GCM Auth-Tags
pub const TAG_LEN: usize = 16;
/// Gesamter Overhead eines verschluesselten Frames
pub const FRAME_OVERHEAD: usize = HEADER_LEN + TAG_LEN;

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone)]
pub struct SecretBytes(pub Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Symmetrischer AES-256-GCM Schluessel, abgeleitet aus einem Shared Secret
#[derive(Clone)]
pub struct SymmetricKey(SecretBytes);

impl SymmetricKey {
    pub fn from_bytes(mut bytes: [u8; KEY_LEN]) -> Self {
        let key = Self(SecretBytes::new(bytes.to_vec()));
        bytes.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Exportierter oeffentlicher Schluessel (base64url ohne Padding)
///
/// Wird ueber den externen Signaling-Kanal uebertragen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportedPublicKey(String);

impl ExportedPublicKey {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExportedPublicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// AEAD-Nonce eines Frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce {
    pub bytes: [u8; NONCE_LEN],
}

impl Nonce {
    /// Erstellt eine Nonce aus Frame-Zaehler + 8 Zufalls-Bytes
    pub fn aus_zaehler(zaehler: u32, random: [u8; 8]) -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        bytes[0..4].copy_from_slice(&zaehler.to_le_bytes());
        bytes[4..12].copy_from_slice(&random);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.bytes
    }

    /// Liest den Zaehler-Anteil aus der Nonce
    pub fn zaehler(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }
}

/// Header eines verschluesselten Frames (Zaehler + Nonce)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub zaehler: u32,
    pub nonce: Nonce,
}

impl FrameHeader {
    pub fn neu(zaehler: u32, nonce: Nonce) -> Self {
        Self { zaehler, nonce }
    }

    /// Haengt den Header an `out` an
    pub fn schreiben(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.zaehler.to_le_bytes());
        out.extend_from_slice(&self.nonce.bytes);
    }

    /// Zerlegt einen Puffer in Header und Ciphertext
    ///
    /// Gibt `None` zurueck wenn der Puffer kuerzer als der Header ist.
    pub fn lesen(buffer: &[u8]) -> Option<(Self, &[u8])> {
        if buffer.len() < HEADER_LEN {
            return None;
        }
        let zaehler = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(&buffer[ZAEHLER_LEN..HEADER_LEN]);

        Some((
            Self {
                zaehler,
                nonce: Nonce { bytes: nonce_bytes },
            },
            &buffer[HEADER_LEN..],
        ))
    }
}
