//! Schnittstelle zur Medien-Pipeline des Hosts
//!
//! Hosts bieten einen von zwei Frame-Hooks an:
//! - `StreamTransformable`: ein Slot, in den ein Transform eingesetzt wird
//!   und der pro Frame synchron aufgerufen wird
//! - `LegacyPipeable`: ein Paar aus lesbarem und schreibbarem Frame-Stream,
//!   zwischen die wir selbst eine Pipe haengen

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{CryptoError, CryptoResult};

/// Ein kodierter Medien-Frame; nur `data` wird vom Transform ersetzt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub data: Vec<u8>,
    pub timestamp: u32,
    pub ssrc: u32,
}

impl EncodedFrame {
    pub fn neu(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: 0,
            ssrc: 0,
        }
    }
}

/// Welchen Frame-Hook ein Endpunkt anbietet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformCapability {
    StreamTransformable,
    LegacyPipeable,
    Unsupported,
}

/// Wird pro Frame aufgerufen; `None` verwirft den Frame
pub trait FrameTransform: Send + Sync {
    fn transform(&self, frame: EncodedFrame) -> Option<EncodedFrame>;
}

/// Lesbare und schreibbare Seite eines `LegacyPipeable`-Endpunkts
#[derive(Debug)]
pub struct EncodedStreams {
    pub readable: mpsc::Receiver<EncodedFrame>,
    pub writable: mpsc::Sender<EncodedFrame>,
}

/// Sender oder Receiver der Host-Pipeline
pub trait MediaEndpoint {
    fn capability(&self) -> TransformCapability;

    fn install_transform(&mut self, _transform: Arc<dyn FrameTransform>) -> CryptoResult<()> {
        Err(CryptoError::TransformNichtUnterstuetzt)
    }

    fn create_encoded_streams(&mut self) -> CryptoResult<EncodedStreams> {
        Err(CryptoError::TransformNichtUnterstuetzt)
    }
}
