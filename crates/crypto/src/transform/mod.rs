//! Anbindung an die Frame-Hooks der Medien-Pipeline
//!
//! Reine Verdrahtung: ausgehende Frames laufen durch `encrypt_frame`,
//! eingehende durch die Entschluesselung des Kontexts.

pub mod binding;
pub mod endpoint;
pub mod speicher;

pub use binding::{
    apply_decryption_transform, apply_encryption_transform, supports_frame_transforms,
    DecryptTransform, EncryptTransform, Richtung, TransformBinding,
};
pub use endpoint::{
    EncodedFrame, EncodedStreams, FrameTransform, MediaEndpoint, TransformCapability,
};
