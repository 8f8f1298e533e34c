//! Frame-Entschluesselung
//!
//! Jeder Frame traegt seine Nonce selbst; der Zaehler des Kontexts wird hier
//! nicht gelesen und nicht veraendert.
//!
//! `decrypt_frame` ist fail-open: schlaegt die Authentifizierung fehl, kommen
//! die Originalbytes zurueck. Wer ein explizites Signal braucht, nutzt
//! `open_frame`.

use aes_gcm::aead::Aead;
use aes_gcm::Nonce as AesNonce;

use crate::e2e::context::E2eeContext;
use crate::error::CryptoError;
use crate::types::FrameHeader;

/// Ergebnis eines Entschluesselungsversuchs
#[derive(Debug)]
pub enum DecryptOutcome {
    Entschluesselt(Vec<u8>),
    /// Kein Schluessel oder Puffer kuerzer als der Header
    Durchgereicht,
    Fehlgeschlagen(CryptoError),
}

impl DecryptOutcome {
    pub fn ist_fehlgeschlagen(&self) -> bool {
        matches!(self, Self::Fehlgeschlagen(_))
    }
}

/// Entschluesselt einen Frame und meldet, was passiert ist
pub fn open_frame(ctx: &E2eeContext, buffer: &[u8]) -> DecryptOutcome {
    let Some(sitzung) = ctx.sitzung() else {
        ctx.statistik.durchgereicht_zaehlen();
        return DecryptOutcome::Durchgereicht;
    };

    let Some((header, ciphertext)) = FrameHeader::lesen(buffer) else {
        ctx.statistik.durchgereicht_zaehlen();
        tracing::trace!(kontext = %ctx.id(), laenge = buffer.len(), "Frame zu kurz, durchgereicht");
        return DecryptOutcome::Durchgereicht;
    };

    // Der Zaehler ist nicht authentisiert; er muss den Nonce-Praefix wiederholen
    if header.zaehler != header.nonce.zaehler() {
        ctx.statistik.fehlgeschlagen_zaehlen();
        return DecryptOutcome::Fehlgeschlagen(CryptoError::Entschluesselung(format!(
            "Zaehler {} passt nicht zur Nonce ({})",
            header.zaehler,
            header.nonce.zaehler()
        )));
    }

    match sitzung
        .empfangen
        .decrypt(AesNonce::from_slice(header.nonce.as_bytes()), ciphertext)
    {
        Ok(plaintext) => {
            ctx.statistik.entschluesselt_zaehlen();
            tracing::trace!(
                kontext = %ctx.id(),
                zaehler = header.zaehler,
                laenge = plaintext.len(),
                "Frame entschluesselt"
            );
            DecryptOutcome::Entschluesselt(plaintext)
        }
        Err(e) => {
            ctx.statistik.fehlgeschlagen_zaehlen();
            DecryptOutcome::Fehlgeschlagen(CryptoError::Entschluesselung(e.to_string()))
        }
    }
}

/// Entschluesselt einen Frame (fail-open)
///
/// Gibt `buffer` unveraendert zurueck wenn kein Schluessel etabliert ist, der
/// Puffer kuerzer als 16 Bytes ist oder die Entschluesselung fehlschlaegt.
pub fn decrypt_frame(ctx: &E2eeContext, buffer: &[u8]) -> Vec<u8> {
    match open_frame(ctx, buffer) {
        DecryptOutcome::Entschluesselt(plaintext) => plaintext,
        DecryptOutcome::Durchgereicht => buffer.to_vec(),
        DecryptOutcome::Fehlgeschlagen(e) => {
            tracing::debug!(
                kontext = %ctx.id(),
                laenge = buffer.len(),
                fehler = %e,
                "Frame nicht authentisch, Originalbytes werden weitergegeben"
            );
            buffer.to_vec()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{E2eeConfig, SchluesselModus};
    use crate::e2e::encrypt::encrypt_frame;

    fn verbundenes_paar_mit(config: E2eeConfig) -> (E2eeContext, E2eeContext) {
        let alice = E2eeContext::mit_config(config.clone()).unwrap();
        let bob = E2eeContext::mit_config(config).unwrap();
        alice
            .establish_shared_key(bob.exported_public_key().as_str())
            .unwrap();
        bob.establish_shared_key(alice.exported_public_key().as_str())
            .unwrap();
        (alice, bob)
    }

    fn verbundenes_paar() -> (E2eeContext, E2eeContext) {
        verbundenes_paar_mit(E2eeConfig::default())
    }

    #[test]
    fn roundtrip_verschiedene_groessen() {
        let (alice, bob) = verbundenes_paar();
        for groesse in [0usize, 1, 1024, 65536] {
            let data: Vec<u8> = (0..groesse).map(|i| (i % 251) as u8).collect();
            let frame = encrypt_frame(&alice, &data).unwrap();
            assert_eq!(frame.len(), groesse + 32);
            assert_eq!(decrypt_frame(&bob, &frame), data, "Groesse {groesse}");
        }
    }

    #[test]
    fn entschluesseln_beruehrt_zaehler_nicht() {
        let (alice, bob) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"audio").unwrap();

        for _ in 0..3 {
            decrypt_frame(&bob, &frame);
        }
        assert_eq!(bob.frame_counter(), 0);
        assert_eq!(alice.frame_counter(), 1);
        assert_eq!(bob.statistik().entschluesselt, 3);
    }

    #[test]
    fn ohne_schluessel_wird_durchgereicht() {
        let (alice, _) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"Hello").unwrap();

        let carol = E2eeContext::new().unwrap();
        assert_eq!(decrypt_frame(&carol, &frame), frame);
        assert!(matches!(open_frame(&carol, &frame), DecryptOutcome::Durchgereicht));
    }

    #[test]
    fn kurzer_puffer_wird_durchgereicht() {
        let (_, bob) = verbundenes_paar();
        for len in 0..16 {
            let data = vec![0x5A; len];
            assert_eq!(decrypt_frame(&bob, &data), data);
        }
        assert_eq!(bob.statistik().durchgereicht, 16);
        assert_eq!(bob.statistik().fehlgeschlagen, 0);
    }

    #[test]
    fn manipulierter_frame_kommt_unveraendert_zurueck() {
        let (alice, bob) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"Original-Audio").unwrap();

        for position in 0..frame.len() {
            for bit in 0..8 {
                let mut manipuliert = frame.clone();
                manipuliert[position] ^= 1 << bit;
                assert_eq!(
                    decrypt_frame(&bob, &manipuliert),
                    manipuliert,
                    "Byte {position}, Bit {bit}"
                );
            }
        }
        assert_eq!(bob.statistik().entschluesselt, 0);
    }

    #[test]
    fn zaehler_abweichend_von_nonce_schlaegt_fehl() {
        let (alice, bob) = verbundenes_paar();
        let mut frame = encrypt_frame(&alice, b"Hello").unwrap();
        frame[0] ^= 0x01;

        assert_eq!(decrypt_frame(&bob, &frame), frame);
        assert!(matches!(
            open_frame(&bob, &frame),
            DecryptOutcome::Fehlgeschlagen(CryptoError::Entschluesselung(_))
        ));
        assert_eq!(bob.statistik().fehlgeschlagen, 2);
    }

    #[test]
    fn open_frame_meldet_fehler() {
        let (alice, bob) = verbundenes_paar();
        let mut frame = encrypt_frame(&alice, b"audio").unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0x80;

        let ergebnis = open_frame(&bob, &frame);
        assert!(ergebnis.ist_fehlgeschlagen());
        assert!(matches!(
            ergebnis,
            DecryptOutcome::Fehlgeschlagen(CryptoError::Entschluesselung(_))
        ));
        assert_eq!(bob.statistik().fehlgeschlagen, 1);
    }

    #[test]
    fn nur_header_ohne_tag_schlaegt_fehl() {
        let (alice, bob) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"").unwrap();
        let abgeschnitten = &frame[..16];
        assert_eq!(decrypt_frame(&bob, abgeschnitten), abgeschnitten);
        assert!(open_frame(&bob, abgeschnitten).ist_fehlgeschlagen());
    }

    #[test]
    fn fremder_schluessel_kann_nicht_entschluesseln() {
        let (alice, _) = verbundenes_paar();
        let (_, mallory) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"Geheime Audio-Daten").unwrap();
        assert_eq!(decrypt_frame(&mallory, &frame), frame);
    }

    #[test]
    fn symmetrischer_modus_entschluesselt_eigene_frames() {
        let (alice, _) = verbundenes_paar();
        let frame = encrypt_frame(&alice, b"echo").unwrap();
        assert_eq!(decrypt_frame(&alice, &frame), b"echo");
    }

    #[test]
    fn richtungsgebundene_schluessel() {
        let config = E2eeConfig {
            schluessel_modus: SchluesselModus::Richtungsgebunden,
            ..E2eeConfig::default()
        };
        let (alice, bob) = verbundenes_paar_mit(config);

        let an_bob = encrypt_frame(&alice, b"Hallo Bob").unwrap();
        let an_alice = encrypt_frame(&bob, b"Hallo Alice").unwrap();
        assert_eq!(decrypt_frame(&bob, &an_bob), b"Hallo Bob");
        assert_eq!(decrypt_frame(&alice, &an_alice), b"Hallo Alice");

        // Eigene Frames sind mit dem Empfangsschluessel nicht lesbar
        assert!(open_frame(&alice, &an_bob).ist_fehlgeschlagen());
        assert!(open_frame(&bob, &an_alice).ist_fehlgeschlagen());
    }

    #[test]
    fn gemischte_modi_sind_inkompatibel() {
        let alice = E2eeContext::new().unwrap();
        let bob = E2eeContext::mit_config(E2eeConfig {
            schluessel_modus: SchluesselModus::Richtungsgebunden,
            ..E2eeConfig::default()
        })
        .unwrap();
        alice
            .establish_shared_key(bob.exported_public_key().as_str())
            .unwrap();
        bob.establish_shared_key(alice.exported_public_key().as_str())
            .unwrap();

        let frame = encrypt_frame(&alice, b"x").unwrap();
        assert!(open_frame(&bob, &frame).ist_fehlgeschlagen());
    }
}
