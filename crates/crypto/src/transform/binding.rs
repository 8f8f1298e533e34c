//! Bindet einen `E2eeContext` an den Frame-Hook eines Endpunkts
//!
//! Die Hook-Form wird einmal beim Binden abgefragt. Bei `LegacyPipeable`
//! laeuft ein Tokio-Task, der Frames in Eingangsreihenfolge durch den
//! Transform schiebt; dafuer muss eine Tokio-Runtime aktiv sein.

use std::sync::Arc;

use tokio::sync::mpsc::error::SendError;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::FehlerPolitik;
use crate::e2e::context::E2eeContext;
use crate::e2e::decrypt::{open_frame, DecryptOutcome};
use crate::e2e::encrypt::encrypt_frame;
use crate::error::{CryptoError, CryptoResult};
use crate::transform::endpoint::{
    EncodedFrame, EncodedStreams, FrameTransform, MediaEndpoint, TransformCapability,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Richtung {
    Senden,
    Empfangen,
}

impl std::fmt::Display for Richtung {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Senden => f.write_str("senden"),
            Self::Empfangen => f.write_str("empfangen"),
        }
    }
}

/// Ersetzt ausgehende Payloads durch `encrypt_frame`
///
/// Schlaegt die Verschluesselung fehl (z.B. erschoepfter Zaehler), wird der
/// Frame verworfen statt im Klartext gesendet.
pub struct EncryptTransform {
    kontext: Arc<E2eeContext>,
}

impl EncryptTransform {
    pub fn new(kontext: Arc<E2eeContext>) -> Self {
        Self { kontext }
    }
}

impl FrameTransform for EncryptTransform {
    fn transform(&self, mut frame: EncodedFrame) -> Option<EncodedFrame> {
        match encrypt_frame(&self.kontext, &frame.data) {
            Ok(data) => {
                frame.data = data;
                Some(frame)
            }
            Err(e) => {
                tracing::warn!(kontext = %self.kontext.id(), fehler = %e, "Frame verworfen");
                None
            }
        }
    }
}

/// Ersetzt eingehende Payloads durch den entschluesselten Inhalt
pub struct DecryptTransform {
    kontext: Arc<E2eeContext>,
    politik: FehlerPolitik,
}

impl DecryptTransform {
    pub fn new(kontext: Arc<E2eeContext>) -> Self {
        let politik = kontext.config().fehler_politik;
        Self { kontext, politik }
    }
}

impl FrameTransform for DecryptTransform {
    fn transform(&self, mut frame: EncodedFrame) -> Option<EncodedFrame> {
        match open_frame(&self.kontext, &frame.data) {
            DecryptOutcome::Entschluesselt(data) => {
                frame.data = data;
                Some(frame)
            }
            DecryptOutcome::Durchgereicht => Some(frame),
            DecryptOutcome::Fehlgeschlagen(e) => match self.politik {
                FehlerPolitik::Durchreichen => {
                    tracing::debug!(kontext = %self.kontext.id(), fehler = %e, "Frame durchgereicht");
                    Some(frame)
                }
                FehlerPolitik::Verwerfen => {
                    tracing::debug!(kontext = %self.kontext.id(), fehler = %e, "Frame verworfen");
                    None
                }
            },
        }
    }
}

/// Aktive Bindung eines Kontexts an einen Endpunkt
///
/// Der Pipe-Task endet, wenn die lesbare Seite geschlossen wird; ein
/// Drop der Bindung bricht ihn nicht ab.
#[derive(Debug)]
pub struct TransformBinding {
    kontext: Uuid,
    richtung: Richtung,
    form: TransformCapability,
    aufgabe: Option<JoinHandle<u64>>,
}

impl TransformBinding {
    pub fn kontext(&self) -> Uuid {
        self.kontext
    }

    pub fn richtung(&self) -> Richtung {
        self.richtung
    }

    pub fn form(&self) -> TransformCapability {
        self.form
    }

    /// `true` solange ein Pipe-Task laeuft
    pub fn ist_aktiv(&self) -> bool {
        self.aufgabe.as_ref().is_some_and(|a| !a.is_finished())
    }

    /// Wartet auf das Ende des Pipe-Tasks und liefert die Anzahl
    /// weitergeleiteter Frames (`None` fuer Transform-Slots)
    pub async fn beenden(self) -> CryptoResult<Option<u64>> {
        match self.aufgabe {
            Some(aufgabe) => aufgabe
                .await
                .map(Some)
                .map_err(|e| CryptoError::Pipeline(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn abbrechen(&self) {
        if let Some(aufgabe) = &self.aufgabe {
            aufgabe.abort();
        }
    }
}

/// Capability-Probe: bietet der Endpunkt einen Frame-Hook an?
pub fn supports_frame_transforms<E: MediaEndpoint + ?Sized>(endpoint: &E) -> bool {
    endpoint.capability() != TransformCapability::Unsupported
}

/// Bindet Verschluesselung an einen sendenden Endpunkt
pub fn apply_encryption_transform<E: MediaEndpoint + ?Sized>(
    sender: &mut E,
    kontext: Arc<E2eeContext>,
) -> CryptoResult<TransformBinding> {
    let id = kontext.id();
    binden(sender, Arc::new(EncryptTransform::new(kontext)), id, Richtung::Senden)
}

/// Bindet Entschluesselung an einen empfangenden Endpunkt
pub fn apply_decryption_transform<E: MediaEndpoint + ?Sized>(
    receiver: &mut E,
    kontext: Arc<E2eeContext>,
) -> CryptoResult<TransformBinding> {
    let id = kontext.id();
    binden(receiver, Arc::new(DecryptTransform::new(kontext)), id, Richtung::Empfangen)
}

fn binden<E: MediaEndpoint + ?Sized>(
    endpoint: &mut E,
    transform: Arc<dyn FrameTransform>,
    kontext: Uuid,
    richtung: Richtung,
) -> CryptoResult<TransformBinding> {
    let form = endpoint.capability();
    let aufgabe = match form {
        TransformCapability::StreamTransformable => {
            endpoint.install_transform(transform)?;
            None
        }
        TransformCapability::LegacyPipeable => {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| CryptoError::Pipeline(format!("keine Tokio-Runtime: {e}")))?;
            let streams = endpoint.create_encoded_streams()?;
            let span = tracing::debug_span!("frame_pipe", kontext = %kontext, richtung = %richtung);
            Some(runtime.spawn(pipe(streams, transform).instrument(span)))
        }
        TransformCapability::Unsupported => {
            return Err(CryptoError::TransformNichtUnterstuetzt);
        }
    };

    tracing::debug!(kontext = %kontext, richtung = %richtung, form = ?form, "Frame-Transform gebunden");

    Ok(TransformBinding {
        kontext,
        richtung,
        form,
        aufgabe,
    })
}

async fn pipe(mut streams: EncodedStreams, transform: Arc<dyn FrameTransform>) -> u64 {
    let mut weitergeleitet = 0u64;

    while let Some(frame) = streams.readable.recv().await {
        let Some(frame) = transform.transform(frame) else {
            continue;
        };
        if let Err(SendError(_)) = streams.writable.send(frame).await {
            tracing::debug!("Schreibbare Seite geschlossen, Pipe endet");
            break;
        }
        weitergeleitet += 1;
    }

    tracing::debug!(weitergeleitet, "Pipe beendet");
    weitergeleitet
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
