//! Langzeit-Identitaetsschluessel (Ed25519)
//!
//! Unabhaengig von den ephemeren ECDH-Paaren einer Sitzung. Eine Identity
//! signiert den exportierten ECDH-Schluessel, damit die Gegenseite einen
//! untergeschobenen Schluessel (aktiver Angreifer im Signaling) erkennt.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::e2e::key_exchange::{decode_base64url, encode_base64url};
use crate::error::{CryptoError, CryptoResult};
use crate::types::ExportedPublicKey;

/// Domain-Separation fuer signierte ECDH-Schluessel
const SIGNATUR_KONTEXT: &[u8] = b"mediacrypt-ecdh-key-v1|";

/// Langzeit-Identitaet eines Teilnehmers (Ed25519)
pub struct Identity {
    signing_key: SigningKey,
}

/// Oeffentliche Identitaet (nur Verifying Key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIdentity {
    /// Ed25519 Verifying Key (32 Bytes)
    pub public_key_bytes: [u8; 32],
}

impl PublicIdentity {
    pub fn verify(&self, data: &[u8], signature_bytes: &[u8]) -> bool {
        Identity::verify(data, signature_bytes, &self.public_key_bytes)
    }
}

/// Exportierter ECDH-Schluessel mit Ed25519-Signatur
///
/// Wird als JSON ueber den Signaling-Kanal verschickt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPublicKey {
    pub schluessel: ExportedPublicKey,
    /// Ed25519-Signatur, base64url
    pub signatur: String,
}

impl SignedPublicKey {
    /// Prueft die Signatur gegen eine erwartete Identitaet
    pub fn verify(&self, identitaet: &PublicIdentity) -> bool {
        let Ok(signatur) = decode_base64url(&self.signatur) else {
            return false;
        };
        identitaet.verify(&signierte_daten(&self.schluessel), &signatur)
    }

    /// Wie `verify`, gibt aber den Schluessel bzw. einen Fehler zurueck
    pub fn verifizierter_schluessel(
        &self,
        identitaet: &PublicIdentity,
    ) -> CryptoResult<&ExportedPublicKey> {
        if self.verify(identitaet) {
            Ok(&self.schluessel)
        } else {
            Err(CryptoError::SignaturVerifikation(
                "ECDH-Schluessel passt nicht zur Identitaet".into(),
            ))
        }
    }
}

fn signierte_daten(schluessel: &ExportedPublicKey) -> Vec<u8> {
    let mut data = Vec::with_capacity(SIGNATUR_KONTEXT.len() + schluessel.as_str().len());
    data.extend_from_slice(SIGNATUR_KONTEXT);
    data.extend_from_slice(schluessel.as_str().as_bytes());
    data
}

impl Identity {
    /// Generiert ein neues Ed25519-Schluessel-Paar
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Gibt den oeffentlichen Schluessel als Bytes zurueck
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Gibt die oeffentliche Identitaet zurueck
    pub fn public_identity(&self) -> PublicIdentity {
        PublicIdentity {
            public_key_bytes: self.public_key_bytes(),
        }
    }

    /// Signiert Daten mit dem privaten Schluessel (64 Bytes)
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.signing_key.sign(data).to_bytes().to_vec()
    }

    /// Signiert einen exportierten ECDH-Schluessel
    pub fn sign_exported_key(&self, schluessel: &ExportedPublicKey) -> SignedPublicKey {
        let signatur = self.sign(&signierte_daten(schluessel));
        SignedPublicKey {
            schluessel: schluessel.clone(),
            signatur: encode_base64url(&signatur),
        }
    }

    /// Verifiziert eine Signatur mit einem oeffentlichen Schluessel
    ///
    /// Liefert `false` bei jeder Abweichung, auch bei kaputten Eingaben.
    pub fn verify(data: &[u8], signature_bytes: &[u8], public_key_bytes: &[u8; 32]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key_bytes) else {
            return false;
        };
        let Ok(sig_array) = signature_bytes.try_into() else {
            return false;
        };
        let signature = Signature::from_bytes(sig_array);
        verifying_key.verify(data, &signature).is_ok()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity {{ public_key: [Ed25519 VerifyingKey] }}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::e2e::key_exchange::EcdhKeyPair;

    #[test]
    fn identity_signieren_und_verifizieren() {
        let identity = Identity::generate();
        let data = b"Hallo, Frame!";

        let signature = identity.sign(data);
        assert_eq!(signature.len(), 64);

        let pub_key = identity.public_key_bytes();
        assert!(Identity::verify(data, &signature, &pub_key));
    }

    #[test]
    fn falsche_signatur_wird_abgelehnt() {
        let identity = Identity::generate();
        let data = b"Hallo, Frame!";

        let mut signature = identity.sign(data);
        signature[0] ^= 0xFF;

        let pub_key = identity.public_key_bytes();
        assert!(!Identity::verify(data, &signature, &pub_key));
    }

    #[test]
    fn falsche_daten_werden_abgelehnt() {
        let identity = Identity::generate();
        let signature = identity.sign(b"Originaltext");

        let pub_key = identity.public_key_bytes();
        assert!(!Identity::verify(b"Geaenderter Text", &signature, &pub_key));
    }

    #[test]
    fn verschiedene_keys_ablehnen() {
        let id1 = Identity::generate();
        let id2 = Identity::generate();
        let data = b"Testdaten";

        let sig = id1.sign(data);
        assert!(!Identity::verify(data, &sig, &id2.public_key_bytes()));
    }

    #[test]
    fn kaputte_eingaben_liefern_false() {
        let identity = Identity::generate();
        let data = b"Testdaten";
        let sig = identity.sign(data);

        // Falsche Signatur-Laenge
        assert!(!Identity::verify(data, &sig[..63], &identity.public_key_bytes()));
        assert!(!Identity::verify(data, &[], &identity.public_key_bytes()));
        // Veraenderter oeffentlicher Schluessel
        let mut kaputt = identity.public_key_bytes();
        kaputt[0] ^= 0x01;
        assert!(!Identity::verify(data, &sig, &kaputt));
    }

    #[test]
    fn public_identity_serialisierbar() {
        let identity = Identity::generate();
        let pub_id = identity.public_identity();
        let json = serde_json::to_string(&pub_id).unwrap();
        let decoded: PublicIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pub_id);
    }

    #[test]
    fn nur_oeffentlicher_schluessel_wird_serialisiert() {
        let identity = Identity::generate();
        let json = serde_json::to_value(identity.public_identity()).unwrap();
        let felder = json.as_object().unwrap();
        assert_eq!(felder.len(), 1);
        assert_eq!(felder["public_key_bytes"].as_array().unwrap().len(), 32);

        let ecdh = EcdhKeyPair::generate().unwrap();
        let signiert = identity.sign_exported_key(&ecdh.export_public_key());
        let json = serde_json::to_value(&signiert).unwrap();
        let felder: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(felder, vec!["schluessel".to_string(), "signatur".to_string()]);
    }

    #[test]
    fn signierter_ecdh_schluessel() {
        let identity = Identity::generate();
        let ecdh = EcdhKeyPair::generate().unwrap();

        let signiert = identity.sign_exported_key(&ecdh.export_public_key());
        assert!(signiert.verify(&identity.public_identity()));
        assert_eq!(
            signiert
                .verifizierter_schluessel(&identity.public_identity())
                .unwrap(),
            &ecdh.export_public_key()
        );
    }

    #[test]
    fn ausgetauschter_ecdh_schluessel_wird_erkannt() {
        let identity = Identity::generate();
        let echt = EcdhKeyPair::generate().unwrap();
        let angreifer = EcdhKeyPair::generate().unwrap();

        let mut signiert = identity.sign_exported_key(&echt.export_public_key());
        signiert.schluessel = angreifer.export_public_key();

        assert!(!signiert.verify(&identity.public_identity()));
        assert!(matches!(
            signiert.verifizierter_schluessel(&identity.public_identity()),
            Err(CryptoError::SignaturVerifikation(_))
        ));
    }

    #[test]
    fn signierter_schluessel_json_roundtrip() {
        let identity = Identity::generate();
        let ecdh = EcdhKeyPair::generate().unwrap();
        let signiert = identity.sign_exported_key(&ecdh.export_public_key());

        let json = serde_json::to_string(&signiert).unwrap();
        let decoded: SignedPublicKey = serde_json::from_str(&json).unwrap();
        assert!(decoded.verify(&identity.public_identity()));
        assert!(!decoded.signatur.contains(['+', '/', '=']));
    }

    #[test]
    fn fremde_identitaet_lehnt_ab() {
        let alice = Identity::generate();
        let mallory = Identity::generate();
        let ecdh = EcdhKeyPair::generate().unwrap();

        let signiert = mallory.sign_exported_key(&ecdh.export_public_key());
        assert!(!signiert.verify(&alice.public_identity()));
    }
}
