//! Frame-Statistik pro Kontext
//!
//! Macht sichtbar, was `decrypt_frame` bewusst verschweigt: wie viele Frames
//! durchgereicht wurden und wie viele die Authentifizierung nicht bestanden.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct FrameStatistik {
    verschluesselt: AtomicU64,
    entschluesselt: AtomicU64,
    durchgereicht: AtomicU64,
    fehlgeschlagen: AtomicU64,
}

/// Momentaufnahme der Zaehler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatistikSnapshot {
    pub verschluesselt: u64,
    pub entschluesselt: u64,
    /// Frames ohne Schluessel oder zu kurz fuer einen Header
    pub durchgereicht: u64,
    /// Auth-Tag ungueltig oder Ciphertext kaputt
    pub fehlgeschlagen: u64,
}

impl FrameStatistik {
    pub(crate) fn verschluesselt_zaehlen(&self) {
        self.verschluesselt.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn entschluesselt_zaehlen(&self) {
        self.entschluesselt.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn durchgereicht_zaehlen(&self) {
        self.durchgereicht.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fehlgeschlagen_zaehlen(&self) {
        self.fehlgeschlagen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatistikSnapshot {
        StatistikSnapshot {
            verschluesselt: self.verschluesselt.load(Ordering::Relaxed),
            entschluesselt: self.entschluesselt.load(Ordering::Relaxed),
            durchgereicht: self.durchgereicht.load(Ordering::Relaxed),
            fehlgeschlagen: self.fehlgeschlagen.load(Ordering::Relaxed),
        }
    }
}
