//! E2E Verschluesselung (End-to-End)
//!
//! Peer <-> Peer Verschluesselung einzelner Medien-Frames. Der Transport
//! sieht nur Ciphertext.
//!
//! ## Ablauf
//! 1. Jede Seite erstellt einen `E2eeContext` (ephemeres P-256 Paar)
//! 2. Die exportierten Schluessel werden ueber Signaling ausgetauscht
//!    (optional mit `Identity` signiert)
//! 3. `establish_shared_key` leitet den AES-256-GCM Frame-Schluessel ab
//! 4. `encrypt_frame` / `decrypt_frame` pro Frame

pub mod context;
pub mod decrypt;
pub mod encrypt;
pub mod key_exchange;
pub mod statistik;

pub use context::{create_context, E2eeContext};
pub use decrypt::{decrypt_frame, open_frame, DecryptOutcome};
pub use encrypt::encrypt_frame;
pub use key_exchange::{
    decode_base64url, derive_shared_secret, derive_symmetric_key, derive_symmetric_key_mit_info,
    encode_base64url, hkdf_derive, import_peer_public_key, EcdhKeyPair, PeerPublicKey,
    SharedSecret,
};
pub use statistik::{FrameStatistik, StatistikSnapshot};
