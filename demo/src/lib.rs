//! mediacrypt-demo – Bibliotheks-Root
//!
//! Zwei Peers (Alice und Bob) tauschen signierte oeffentliche Schluessel als
//! JSON aus und schicken danach Frames in beide Richtungen. Alice sendet ueber
//! eine Pipe und empfaengt ueber eine Pipe, Bob nutzt Transform-Slots; damit
//! laufen beide Hook-Formen in beiden Richtungen.

pub mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::DemoConfig;
use mediacrypt_crypto::transform::speicher::{PipeEndpunkt, PipeHost, SlotEndpunkt};
use mediacrypt_crypto::{
    apply_decryption_transform, apply_encryption_transform, E2eeContext, EncodedFrame, Identity,
    PublicIdentity, SignedPublicKey, StatistikSnapshot,
};
use mediacrypt_observability::MediacryptMetrics;
use rand::RngCore;
use serde::Serialize;
use tokio::sync::mpsc;

/// Ergebnis einer Senderichtung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RichtungsBericht {
    pub gesendet: u32,
    pub angekommen: u32,
    pub korrekt: u32,
}

impl RichtungsBericht {
    fn pruefen(&mut self, frame: &EncodedFrame, originale: &[Vec<u8>]) {
        self.angekommen += 1;
        // Der Zeitstempel traegt den Frame-Index
        if originale.get(frame.timestamp as usize) == Some(&frame.data) {
            self.korrekt += 1;
        }
    }
}

/// Zusammenfassung eines Demo-Laufs
#[derive(Debug, Clone, Serialize)]
pub struct DemoBericht {
    pub frames_gesendet: u32,
    pub frames_korrekt: u32,
    pub alice_zu_bob: RichtungsBericht,
    pub bob_zu_alice: RichtungsBericht,
    pub alice: StatistikSnapshot,
    pub bob: StatistikSnapshot,
    /// Prometheus-Text aller Metriken am Ende des Laufs
    #[serde(skip)]
    pub metriken: String,
}

impl DemoBericht {
    pub fn fehlerfrei(&self) -> bool {
        self.frames_korrekt == self.frames_gesendet
    }
}

struct Peer {
    name: &'static str,
    identitaet: Identity,
    kontext: Arc<E2eeContext>,
}

impl Peer {
    fn neu(name: &'static str, config: &DemoConfig) -> Result<Self> {
        let kontext = E2eeContext::mit_config(config.e2ee.clone())
            .with_context(|| format!("Kontext fuer {name} nicht erstellbar"))?;
        Ok(Self {
            name,
            identitaet: Identity::generate(),
            kontext: Arc::new(kontext),
        })
    }

    /// Signierter oeffentlicher Schluessel, so wie er ueber das Signaling geht
    fn angebot(&self) -> Result<String> {
        let signiert = self
            .identitaet
            .sign_exported_key(self.kontext.exported_public_key());
        Ok(serde_json::to_string(&signiert)?)
    }

    fn angebot_annehmen(&self, von: &str, identitaet: &PublicIdentity, json: &str) -> Result<()> {
        let angebot: SignedPublicKey = serde_json::from_str(json)?;
        let schluessel = angebot
            .verifizierter_schluessel(identitaet)
            .with_context(|| format!("Signatur von {von} ungueltig"))?;
        self.kontext.establish_shared_key(schluessel.as_str())?;
        tracing::info!(peer = self.name, von, "Schluessel etabliert");
        Ok(())
    }
}

/// Haelt den Demo-Lauf zusammen
pub struct Demo {
    pub config: DemoConfig,
}

impl Demo {
    pub fn neu(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Fuehrt den Demo-Lauf aus
    ///
    /// Reihenfolge:
    /// 1. Alice und Bob mit Identitaet und Kontext anlegen
    /// 2. Signierte Schluessel als JSON austauschen und pruefen
    /// 3. Alice -> Bob: Pipe-Sender, Slot-Empfaenger
    /// 4. Bob -> Alice: Slot-Sender, Pipe-Empfaenger
    /// 5. Statistik in die Metriken uebernehmen
    pub async fn starten(self) -> Result<DemoBericht> {
        let metriken = MediacryptMetrics::neu()?;
        let alice = Peer::neu("alice", &self.config)?;
        let bob = Peer::neu("bob", &self.config)?;
        metriken.kontexte_aktiv.set(2);

        tracing::info!(
            alice = %alice.kontext.id(),
            bob = %bob.kontext.id(),
            modus = ?self.config.e2ee.schluessel_modus,
            "Peers erstellt"
        );

        let von_alice = alice.angebot()?;
        let von_bob = bob.angebot()?;
        bob.angebot_annehmen("alice", &alice.identitaet.public_identity(), &von_alice)?;
        metriken.schluessel_etabliert_total.inc();
        alice.angebot_annehmen("bob", &bob.identitaet.public_identity(), &von_bob)?;
        metriken.schluessel_etabliert_total.inc();

        let alice_zu_bob = self
            .pipe_zu_slot(&alice.kontext, &bob.kontext, &metriken)
            .await?;
        let bob_zu_alice = self
            .slot_zu_pipe(&bob.kontext, &alice.kontext, &metriken)
            .await?;

        let alice_statistik = alice.kontext.statistik();
        let bob_statistik = bob.kontext.statistik();
        metriken.statistik_erfassen(alice.name, &alice_statistik);
        metriken.statistik_erfassen(bob.name, &bob_statistik);

        let bericht = DemoBericht {
            frames_gesendet: alice_zu_bob.gesendet + bob_zu_alice.gesendet,
            frames_korrekt: alice_zu_bob.korrekt + bob_zu_alice.korrekt,
            alice_zu_bob,
            bob_zu_alice,
            alice: alice_statistik,
            bob: bob_statistik,
            metriken: metriken.exportieren()?,
        };

        tracing::info!(
            gesendet = bericht.frames_gesendet,
            korrekt = bericht.frames_korrekt,
            alice_zaehler = alice.kontext.frame_counter(),
            bob_zaehler = bob.kontext.frame_counter(),
            "Demo-Lauf beendet"
        );
        tracing::debug!(metriken = %bericht.metriken, "Metriken");

        Ok(bericht)
    }

    async fn pipe_zu_slot(
        &self,
        sender: &Arc<E2eeContext>,
        empfaenger: &Arc<E2eeContext>,
        metriken: &MediacryptMetrics,
    ) -> Result<RichtungsBericht> {
        let (mut pipe, host) = PipeEndpunkt::neu(self.config.demo.kanal_kapazitaet);
        let mut slot = SlotEndpunkt::new();
        let senden = apply_encryption_transform(&mut pipe, Arc::clone(sender))?;
        apply_decryption_transform(&mut slot, Arc::clone(empfaenger))?;

        let originale = self.originale();
        let mut bericht = RichtungsBericht {
            gesendet: originale.len() as u32,
            ..Default::default()
        };

        let PipeHost {
            eingang,
            mut ausgang,
        } = host;
        let einspeisung = tokio::spawn(einspeisen(eingang, frames(&originale, 1)));

        while let Some(verschluesselt) = ausgang.recv().await {
            metriken
                .frame_groesse_bytes
                .observe(verschluesselt.data.len() as f64);
            if let Some(klar) = slot.verarbeiten(verschluesselt) {
                bericht.pruefen(&klar, &originale);
            }
        }

        einspeisung.await??;
        let weitergeleitet = senden.beenden().await?.unwrap_or(0);
        tracing::debug!(weitergeleitet, "Alice -> Bob abgeschlossen");
        Ok(bericht)
    }

    async fn slot_zu_pipe(
        &self,
        sender: &Arc<E2eeContext>,
        empfaenger: &Arc<E2eeContext>,
        metriken: &MediacryptMetrics,
    ) -> Result<RichtungsBericht> {
        let mut slot = SlotEndpunkt::new();
        let (mut pipe, host) = PipeEndpunkt::neu(self.config.demo.kanal_kapazitaet);
        apply_encryption_transform(&mut slot, Arc::clone(sender))?;
        let empfangen = apply_decryption_transform(&mut pipe, Arc::clone(empfaenger))?;

        let originale = self.originale();
        let mut bericht = RichtungsBericht {
            gesendet: originale.len() as u32,
            ..Default::default()
        };

        let verschluesselt: Vec<EncodedFrame> = frames(&originale, 2)
            .into_iter()
            .filter_map(|frame| slot.verarbeiten(frame))
            .collect();
        for frame in &verschluesselt {
            metriken.frame_groesse_bytes.observe(frame.data.len() as f64);
        }

        let PipeHost {
            eingang,
            mut ausgang,
        } = host;
        let einspeisung = tokio::spawn(einspeisen(eingang, verschluesselt));

        while let Some(klar) = ausgang.recv().await {
            bericht.pruefen(&klar, &originale);
        }

        einspeisung.await??;
        let weitergeleitet = empfangen.beenden().await?.unwrap_or(0);
        tracing::debug!(weitergeleitet, "Bob -> Alice abgeschlossen");
        Ok(bericht)
    }

    fn originale(&self) -> Vec<Vec<u8>> {
        let mut rng = rand::thread_rng();
        (0..self.config.demo.frames)
            .map(|_| {
                let mut daten = vec![0u8; self.config.demo.frame_groesse];
                rng.fill_bytes(&mut daten);
                daten
            })
            .collect()
    }
}

fn frames(originale: &[Vec<u8>], ssrc: u32) -> Vec<EncodedFrame> {
    originale
        .iter()
        .enumerate()
        .map(|(index, daten)| EncodedFrame {
            data: daten.clone(),
            timestamp: index as u32,
            ssrc,
        })
        .collect()
}

/// Schiebt alle Frames in die Pipe; der Drop des Senders beendet sie
async fn einspeisen(eingang: mpsc::Sender<EncodedFrame>, frames: Vec<EncodedFrame>) -> Result<()> {
    for frame in frames {
        eingang
            .send(frame)
            .await
            .map_err(|_| anyhow::anyhow!("Pipe vorzeitig geschlossen"))?;
    }
    Ok(())
}
