//! ECDH Key Exchange (P-256)
//!
//! Ablauf pro Sitzung:
//! 1. Jede Seite erzeugt ein ephemeres `EcdhKeyPair`
//! 2. Der oeffentliche Schluessel wird als base64url-Text exportiert und
//!    ueber den Signaling-Kanal ausgetauscht
//! 3. Beide Seiten berechnen dasselbe Shared Secret
//! 4. HKDF-SHA256 (Salt = 32 Null-Bytes, festes Info-Label) leitet daraus den
//!    AES-256-GCM Frame-Schluessel ab

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey as P256PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::config::DEFAULT_HKDF_INFO;
use crate::error::{CryptoError, CryptoResult};
use crate::types::{ExportedPublicKey, SecretBytes, SymmetricKey, KEY_LEN};

/// Fester HKDF-Salt (32 Null-Bytes)
pub const HKDF_SALT: [u8; 32] = [0u8; 32];

/// Laenge eines unkomprimierten SEC1-Punkts auf P-256
pub const PUBLIC_KEY_LEN: usize = 65;

const SEC1_UNKOMPRIMIERT: u8 = 0x04;

/// Maximale Versuche fuer einen gueltigen Skalar (Fehlschlag ~2^-32 pro Versuch)
const MAX_GENERIERUNGS_VERSUCHE: usize = 4;

/// Ephemeres ECDH-Schluessel-Paar (P-256)
///
/// Der private Schluessel verlaesst das Paar nie und wird beim Drop genullt.
pub struct EcdhKeyPair {
    secret: SecretKey,
    public: P256PublicKey,
}

impl EcdhKeyPair {
    /// Erzeugt ein frisches Schluessel-Paar aus dem OS-Zufallsgenerator
    ///
    /// Ein ausfallender Zufallsgenerator wird als `SchluesselGenerierung`
    /// gemeldet; `SecretKey::random` wuerde in diesem Fall paniken.
    pub fn generate() -> CryptoResult<Self> {
        for _ in 0..MAX_GENERIERUNGS_VERSUCHE {
            let mut kandidat = [0u8; 32];
            OsRng
                .try_fill_bytes(&mut kandidat)
                .map_err(|e| CryptoError::SchluesselGenerierung(e.to_string()))?;

            let secret = SecretKey::from_slice(&kandidat);
            kandidat.zeroize();

            if let Ok(secret) = secret {
                let public = secret.public_key();
                return Ok(Self { secret, public });
            }
        }

        Err(CryptoError::SchluesselGenerierung(
            "kein gueltiger P-256 Skalar erzeugt".into(),
        ))
    }

    /// Rohe Punkt-Darstellung (65 Bytes, unkomprimiert)
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Exportiert den oeffentlichen Schluessel als base64url-Text
    pub fn export_public_key(&self) -> ExportedPublicKey {
        ExportedPublicKey::new(encode_base64url(&self.public_key_bytes()))
    }

    /// Oeffentlicher Schluessel als Handle fuer die Gegenseite
    pub fn public_key(&self) -> PeerPublicKey {
        PeerPublicKey(self.public)
    }
}

impl std::fmt::Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcdhKeyPair {{ public: {} }}", self.export_public_key())
    }
}

/// Importierter oeffentlicher Schluessel der Gegenseite (nur fuer ECDH)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerPublicKey(P256PublicKey);

impl PeerPublicKey {
    /// Kanonische base64url-Darstellung
    pub fn export(&self) -> ExportedPublicKey {
        ExportedPublicKey::new(encode_base64url(self.0.to_encoded_point(false).as_bytes()))
    }
}

/// Rohes Ergebnis der Schluesselvereinbarung, existiert nur waehrend der Ableitung
#[derive(Debug)]
pub struct SharedSecret(SecretBytes);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Parst einen base64url-kodierten P-256 Punkt
pub fn import_peer_public_key(text: &str) -> CryptoResult<PeerPublicKey> {
    let bytes = decode_base64url(text)
        .map_err(|e| CryptoError::SchluesselImport(format!("kein base64url: {e}")))?;

    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(CryptoError::SchluesselImport(format!(
            "erwartet {PUBLIC_KEY_LEN} Bytes, erhalten {}",
            bytes.len()
        )));
    }
    if bytes[0] != SEC1_UNKOMPRIMIERT {
        return Err(CryptoError::SchluesselImport(format!(
            "unbekanntes Punkt-Format 0x{:02x}",
            bytes[0]
        )));
    }

    P256PublicKey::from_sec1_bytes(&bytes)
        .map(PeerPublicKey)
        .map_err(|_| CryptoError::SchluesselImport("Punkt liegt nicht auf P-256".into()))
}

/// Fuehrt den DH-Austausch durch
///
/// Kommutativ: `derive(A, B.pub) == derive(B, A.pub)`.
pub fn derive_shared_secret(own: &EcdhKeyPair, peer: &PeerPublicKey) -> SharedSecret {
    let shared = p256::ecdh::diffie_hellman(own.secret.to_nonzero_scalar(), peer.0.as_affine());
    SharedSecret(SecretBytes::new(shared.raw_secret_bytes().to_vec()))
}

/// Leitet den Frame-Schluessel mit dem Standard-Label ab
pub fn derive_symmetric_key(secret: &SharedSecret) -> CryptoResult<SymmetricKey> {
    derive_symmetric_key_mit_info(secret, DEFAULT_HKDF_INFO.as_bytes())
}

/// Leitet einen AES-256-GCM Schluessel via HKDF-SHA256 ab
pub fn derive_symmetric_key_mit_info(
    secret: &SharedSecret,
    info: &[u8],
) -> CryptoResult<SymmetricKey> {
    let mut okm = hkdf_derive(secret.as_bytes(), &HKDF_SALT, info, KEY_LEN)?;
    let mut key_bytes = [0u8; KEY_LEN];
    key_bytes.copy_from_slice(&okm);
    okm.zeroize();
    Ok(SymmetricKey::from_bytes(key_bytes))
}

/// HKDF-Info fuer richtungsgebundene Schluessel: `label | sender | empfaenger`
pub fn richtungs_info(
    label: &str,
    sender: &ExportedPublicKey,
    empfaenger: &ExportedPublicKey,
) -> Vec<u8> {
    format!("{label}|{sender}|{empfaenger}").into_bytes()
}

/// HKDF-basierte Key Derivation (allgemein verwendbar)
pub fn hkdf_derive(ikm: &[u8], salt: &[u8], info: &[u8], len: usize) -> CryptoResult<Vec<u8>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; len];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

/// base64url ohne Padding (kein `+`, `/` oder `=`)
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode_base64url(text: &str) -> CryptoResult<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(text)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
