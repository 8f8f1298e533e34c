//! # mediacrypt-crypto
//!
//! Ende-zu-Ende Verschluesselung einzelner Medien-Frames zwischen zwei Peers.
//!
//! ## Module
//! - `e2e` - ECDH-Schluesselaustausch, Sitzungskontext, Frame-Ver-/Entschluesselung
//! - `identity` - Ed25519 Langzeit-Identitaetsschluessel
//! - `transform` - Anbindung an die Frame-Hooks der Medien-Pipeline
//! - `config` - Konfiguration eines Kontexts
//! - `types` - Gemeinsame Typen (Schluessel, Nonce, Frame-Header)
//! - `error` - Fehlertypen

pub mod config;
pub mod e2e;
pub mod error;
pub mod identity;
pub mod transform;
pub mod types;

// Bequeme Re-Exports
pub use config::{E2eeConfig, FehlerPolitik, SchluesselModus};
pub use error::{CryptoError, CryptoResult};
pub use identity::{Identity, PublicIdentity, SignedPublicKey};
pub use types::{ExportedPublicKey, FrameHeader, Nonce, SecretBytes, SymmetricKey};

pub use e2e::{
    create_context, decrypt_frame, encrypt_frame, open_frame, DecryptOutcome, E2eeContext,
    EcdhKeyPair, StatistikSnapshot,
};

pub use transform::{
    apply_decryption_transform, apply_encryption_transform, supports_frame_transforms,
    EncodedFrame, MediaEndpoint, TransformBinding, TransformCapability,
};
