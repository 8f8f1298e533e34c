//! In-Memory-Endpunkte fuer Tests und die Demo
//!
//! Bilden die beiden Hook-Formen ohne echte Medien-Pipeline nach.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{CryptoError, CryptoResult};
use crate::transform::endpoint::{
    EncodedFrame, EncodedStreams, FrameTransform, MediaEndpoint, TransformCapability,
};

/// Endpunkt mit Transform-Slot (`StreamTransformable`)
#[derive(Default)]
pub struct SlotEndpunkt {
    transform: Option<Arc<dyn FrameTransform>>,
}

impl SlotEndpunkt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ist_gebunden(&self) -> bool {
        self.transform.is_some()
    }

    /// Schickt einen Frame durch den Slot (ohne Transform unveraendert)
    pub fn verarbeiten(&self, frame: EncodedFrame) -> Option<EncodedFrame> {
        match &self.transform {
            Some(transform) => transform.transform(frame),
            None => Some(frame),
        }
    }
}

impl MediaEndpoint for SlotEndpunkt {
    fn capability(&self) -> TransformCapability {
        TransformCapability::StreamTransformable
    }

    fn install_transform(&mut self, transform: Arc<dyn FrameTransform>) -> CryptoResult<()> {
        if self.transform.is_some() {
            return Err(CryptoError::TransformBereitsGebunden);
        }
        self.transform = Some(transform);
        Ok(())
    }
}

/// Endpunkt mit Stream-Paar (`LegacyPipeable`)
///
/// Die Streams koennen genau einmal abgeholt werden.
pub struct PipeEndpunkt {
    streams: Option<EncodedStreams>,
}

/// Host-Seite eines `PipeEndpunkt`: Frames hinein, transformierte Frames heraus
#[derive(Debug)]
pub struct PipeHost {
    pub eingang: mpsc::Sender<EncodedFrame>,
    pub ausgang: mpsc::Receiver<EncodedFrame>,
}

impl PipeEndpunkt {
    pub fn neu(kapazitaet: usize) -> (Self, PipeHost) {
        let (eingang, readable) = mpsc::channel(kapazitaet);
        let (writable, ausgang) = mpsc::channel(kapazitaet);
        (
            Self {
                streams: Some(EncodedStreams { readable, writable }),
            },
            PipeHost { eingang, ausgang },
        )
    }
}

impl MediaEndpoint for PipeEndpunkt {
    fn capability(&self) -> TransformCapability {
        TransformCapability::LegacyPipeable
    }

    fn create_encoded_streams(&mut self) -> CryptoResult<EncodedStreams> {
        self.streams
            .take()
            .ok_or(CryptoError::TransformBereitsGebunden)
    }
}

/// Endpunkt ohne Frame-Hook
#[derive(Debug, Default)]
pub struct OhneFrameHook;

impl MediaEndpoint for OhneFrameHook {
    fn capability(&self) -> TransformCapability {
        TransformCapability::Unsupported
    }
}
