//! Prometheus-kompatible Metriken fuer mediacrypt
//!
//! Registrierte Metriken:
//! - `mediacrypt_kontexte_aktiv` – Gauge: Lebende E2EE-Kontexte
//! - `mediacrypt_schluessel_etabliert_total` – Counter: Erfolgreiche Schluesselaustausche
//! - `mediacrypt_frames` – Gauge (kontext, ergebnis): Frame-Statistik pro Kontext
//! - `mediacrypt_frame_groesse_bytes` – Histogram: Groesse verschluesselter Frames
//!
//! Kein HTTP-Endpunkt; der Text aus `exportieren()` kann vom Host
//! ausgeliefert oder geloggt werden.

use anyhow::Result;
use mediacrypt_crypto::StatistikSnapshot;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle mediacrypt-Prometheus-Metriken
#[derive(Clone)]
pub struct MediacryptMetrics {
    pub registry: Arc<Registry>,

    pub kontexte_aktiv: IntGauge,
    pub schluessel_etabliert_total: IntCounter,
    pub frames: IntGaugeVec,
    pub frame_groesse_bytes: Histogram,
}

impl MediacryptMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let kontexte_aktiv = IntGauge::with_opts(Opts::new(
            "mediacrypt_kontexte_aktiv",
            "Anzahl lebender E2EE-Kontexte",
        ))?;
        registry.register(Box::new(kontexte_aktiv.clone()))?;

        let schluessel_etabliert_total = IntCounter::with_opts(Opts::new(
            "mediacrypt_schluessel_etabliert_total",
            "Erfolgreich abgeschlossene Schluesselaustausche",
        ))?;
        registry.register(Box::new(schluessel_etabliert_total.clone()))?;

        let frames = IntGaugeVec::new(
            Opts::new("mediacrypt_frames", "Frame-Statistik pro Kontext"),
            &["kontext", "ergebnis"],
        )?;
        registry.register(Box::new(frames.clone()))?;

        let frame_groesse_bytes = Histogram::with_opts(
            HistogramOpts::new(
                "mediacrypt_frame_groesse_bytes",
                "Groesse verschluesselter Frames in Bytes",
            )
            .buckets(vec![
                64.0, 128.0, 256.0, 512.0, 1024.0, 4096.0, 16384.0, 65536.0,
            ]),
        )?;
        registry.register(Box::new(frame_groesse_bytes.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            kontexte_aktiv,
            schluessel_etabliert_total,
            frames,
            frame_groesse_bytes,
        })
    }

    /// Uebernimmt eine Statistik-Momentaufnahme fuer einen Kontext
    pub fn statistik_erfassen(&self, kontext: &str, snapshot: &StatistikSnapshot) {
        let werte = [
            ("verschluesselt", snapshot.verschluesselt),
            ("entschluesselt", snapshot.entschluesselt),
            ("durchgereicht", snapshot.durchgereicht),
            ("fehlgeschlagen", snapshot.fehlgeschlagen),
        ];
        for (ergebnis, wert) in werte {
            self.frames
                .with_label_values(&[kontext, ergebnis])
                .set(i64::try_from(wert).unwrap_or(i64::MAX));
        }
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
