//! Frame-Verschluesselung
//!
//! ## Format
//! ```text
//! [zaehler(4, LE)] [nonce(12)] [ciphertext + auth_tag(16)]
//! ```
//!
//! Die ersten 4 Bytes der Nonce wiederholen den Zaehler, die restlichen 8
//! kommen pro Frame frisch aus dem OS-Zufallsgenerator.

use aes_gcm::aead::Aead;
use aes_gcm::Nonce as AesNonce;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::e2e::context::E2eeContext;
use crate::error::{CryptoError, CryptoResult};
use crate::types::{FrameHeader, Nonce, HEADER_LEN};

/// Verschluesselt einen Frame
///
/// Ohne Sitzungsschluessel wird `plaintext` unveraendert zurueckgegeben, damit
/// Frames schon vor dem Schluesselaustausch fliessen koennen.
pub fn encrypt_frame(ctx: &E2eeContext, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let Some(sitzung) = ctx.sitzung() else {
        ctx.statistik.durchgereicht_zaehlen();
        return Ok(plaintext.to_vec());
    };

    let (header, ciphertext) = ctx.mit_naechstem_zaehler(|zaehler| {
        let mut random = [0u8; 8];
        OsRng.fill_bytes(&mut random);
        let nonce = Nonce::aus_zaehler(zaehler, random);

        let ciphertext = sitzung
            .senden
            .encrypt(AesNonce::from_slice(nonce.as_bytes()), plaintext)
            .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

        Ok((FrameHeader::neu(zaehler, nonce), ciphertext))
    })?;

    let mut frame = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    header.schreiben(&mut frame);
    frame.extend_from_slice(&ciphertext);

    ctx.statistik.verschluesselt_zaehlen();
    tracing::trace!(
        kontext = %ctx.id(),
        zaehler = header.zaehler,
        laenge = frame.len(),
        "Frame verschluesselt"
    );
    Ok(frame)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
