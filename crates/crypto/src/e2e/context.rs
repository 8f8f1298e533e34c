//! Sitzungszustand einer Medien-Richtung (`E2eeContext`)
//!
//! Zwei Zustaende: ohne Schluessel (Frames werden durchgereicht) und mit
//! Schluessel. Der Uebergang ist einseitig; ein erneutes
//! `establish_shared_key` ersetzt den Schluessel, setzt aber den Zaehler
//! nicht zurueck.
//!
//! Ein Kontext darf ueber `Arc` zwischen Tasks geteilt werden. Zaehler lesen,
//! Nonce erzeugen, verschluesseln und Zaehler erhoehen laufen unter demselben
//! Lock.

use std::sync::Arc;

use aes_gcm::{Aes256Gcm, Key, KeyInit};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::{E2eeConfig, SchluesselModus};
use crate::e2e::key_exchange::{
    derive_shared_secret, derive_symmetric_key_mit_info, import_peer_public_key, richtungs_info,
    EcdhKeyPair,
};
use crate::e2e::statistik::{FrameStatistik, StatistikSnapshot};
use crate::error::{CryptoError, CryptoResult};
use crate::types::{ExportedPublicKey, SymmetricKey};

/// Initialisierte AEAD-Instanzen einer Sitzung
pub(crate) struct SessionKeys {
    pub(crate) senden: Aes256Gcm,
    pub(crate) empfangen: Aes256Gcm,
}

impl SessionKeys {
    fn ableiten(
        paar: &EcdhKeyPair,
        eigener: &ExportedPublicKey,
        peer_text: &str,
        config: &E2eeConfig,
    ) -> CryptoResult<Self> {
        let peer = import_peer_public_key(peer_text)?;
        let secret = derive_shared_secret(paar, &peer);

        match config.schluessel_modus {
            SchluesselModus::Symmetrisch => {
                let key = derive_symmetric_key_mit_info(&secret, config.hkdf_info.as_bytes())?;
                let cipher = cipher_aus(&key);
                Ok(Self {
                    senden: cipher.clone(),
                    empfangen: cipher,
                })
            }
            SchluesselModus::Richtungsgebunden => {
                let peer_export = peer.export();
                let senden = derive_symmetric_key_mit_info(
                    &secret,
                    &richtungs_info(&config.hkdf_info, eigener, &peer_export),
                )?;
                let empfangen = derive_symmetric_key_mit_info(
                    &secret,
                    &richtungs_info(&config.hkdf_info, &peer_export, eigener),
                )?;
                Ok(Self {
                    senden: cipher_aus(&senden),
                    empfangen: cipher_aus(&empfangen),
                })
            }
        }
    }
}

fn cipher_aus(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Sitzungszustand: ephemeres Schluessel-Paar, optionaler Sitzungsschluessel,
/// Frame-Zaehler
pub struct E2eeContext {
    id: Uuid,
    schluesselpaar: EcdhKeyPair,
    exportiert: ExportedPublicKey,
    config: E2eeConfig,
    sitzung: RwLock<Option<Arc<SessionKeys>>>,
    zaehler: Mutex<u32>,
    pub(crate) statistik: FrameStatistik,
}

/// Erstellt einen Kontext mit Standard-Konfiguration
pub fn create_context() -> CryptoResult<E2eeContext> {
    E2eeContext::new()
}

impl E2eeContext {
    pub fn new() -> CryptoResult<Self> {
        Self::mit_config(E2eeConfig::default())
    }

    pub fn mit_config(config: E2eeConfig) -> CryptoResult<Self> {
        config.validieren()?;
        let schluesselpaar = EcdhKeyPair::generate()?;
        let exportiert = schluesselpaar.export_public_key();
        let id = Uuid::new_v4();

        tracing::debug!(kontext = %id, modus = ?config.schluessel_modus, "E2EE-Kontext erstellt");

        Ok(Self {
            id,
            schluesselpaar,
            exportiert,
            config,
            sitzung: RwLock::new(None),
            zaehler: Mutex::new(0),
            statistik: FrameStatistik::default(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &E2eeConfig {
        &self.config
    }

    /// Eigener oeffentlicher Schluessel fuer den Signaling-Kanal
    pub fn exported_public_key(&self) -> &ExportedPublicKey {
        &self.exportiert
    }

    /// Importiert den Schluessel der Gegenseite und leitet den
    /// Sitzungsschluessel ab
    ///
    /// Fehler beim Import sind fuer diesen Austausch endgueltig; der Kontext
    /// bleibt dann im bisherigen Zustand.
    pub fn establish_shared_key(&self, peer_public_key_text: &str) -> CryptoResult<()> {
        let keys = SessionKeys::ableiten(
            &self.schluesselpaar,
            &self.exportiert,
            peer_public_key_text,
            &self.config,
        )
        .inspect_err(|e| {
            tracing::warn!(kontext = %self.id, fehler = %e, "Schluesselaustausch fehlgeschlagen");
        })?;

        let mut sitzung = self.sitzung.write();
        if sitzung.is_some() {
            tracing::warn!(kontext = %self.id, "Sitzungsschluessel wird ueberschrieben");
        }
        *sitzung = Some(Arc::new(keys));

        tracing::info!(
            kontext = %self.id,
            modus = ?self.config.schluessel_modus,
            "Sitzungsschluessel etabliert"
        );
        Ok(())
    }

    pub fn is_keyed(&self) -> bool {
        self.sitzung.read().is_some()
    }

    /// Aktueller Zaehlerstand (Wert fuer den naechsten Frame)
    pub fn frame_counter(&self) -> u32 {
        *self.zaehler.lock()
    }

    pub fn statistik(&self) -> StatistikSnapshot {
        self.statistik.snapshot()
    }

    pub(crate) fn sitzung(&self) -> Option<Arc<SessionKeys>> {
        self.sitzung.read().clone()
    }

    /// Fuehrt `f` mit dem naechsten Zaehlerwert aus; der Zaehler steigt nur
    /// wenn `f` erfolgreich ist
    pub(crate) fn mit_naechstem_zaehler<T>(
        &self,
        f: impl FnOnce(u32) -> CryptoResult<T>,
    ) -> CryptoResult<T> {
        let mut zaehler = self.zaehler.lock();
        if *zaehler >= self.config.zaehler_limit {
            tracing::warn!(
                kontext = %self.id,
                limit = self.config.zaehler_limit,
                "Frame-Zaehler erschoepft"
            );
            return Err(CryptoError::ZaehlerErschoepft {
                limit: self.config.zaehler_limit,
            });
        }

        let ergebnis = f(*zaehler)?;
        *zaehler += 1;
        Ok(ergebnis)
    }
}

impl std::fmt::Debug for E2eeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("E2eeContext")
            .field("id", &self.id)
            .field("keyed", &self.is_keyed())
            .field("frame_counter", &self.frame_counter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neuer_kontext_ist_ohne_schluessel() {
        let ctx = create_context().unwrap();
        assert!(!ctx.is_keyed());
        assert_eq!(ctx.frame_counter(), 0);
        assert_eq!(ctx.statistik(), StatistikSnapshot::default());
    }

    #[test]
    fn kontexte_haben_eigene_schluessel() {
        let a = E2eeContext::new().unwrap();
        let b = E2eeContext::new().unwrap();
        assert_ne!(a.exported_public_key(), b.exported_public_key());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn schluessel_etablieren() {
        let alice = E2eeContext::new().unwrap();
        let bob = E2eeContext::new().unwrap();

        alice
            .establish_shared_key(bob.exported_public_key().as_str())
            .unwrap();
        assert!(alice.is_keyed());
        assert!(!bob.is_keyed());
    }

    #[test]
    fn ungueltiger_peer_schluessel_laesst_kontext_unveraendert() {
        let ctx = E2eeContext::new().unwrap();
        let result = ctx.establish_shared_key("kaputt");
        assert!(matches!(result, Err(CryptoError::SchluesselImport(_))));
        assert!(!ctx.is_keyed());
    }

    #[test]
    fn ungueltige_config_wird_abgelehnt() {
        let config = E2eeConfig {
            hkdf_info: String::new(),
            ..E2eeConfig::default()
        };
        assert!(E2eeContext::mit_config(config).is_err());
    }

    #[test]
    fn zaehler_steigt_nur_bei_erfolg() {
        let ctx = E2eeContext::new().unwrap();

        let wert = ctx.mit_naechstem_zaehler(Ok).unwrap();
        assert_eq!(wert, 0);
        assert_eq!(ctx.frame_counter(), 1);

        let fehler: CryptoResult<()> = ctx.mit_naechstem_zaehler(|_| {
            Err(CryptoError::Verschluesselung("test".into()))
        });
        assert!(fehler.is_err());
        assert_eq!(ctx.frame_counter(), 1);
    }

    #[test]
    fn zaehler_limit_wird_durchgesetzt() {
        let config = E2eeConfig {
            zaehler_limit: 2,
            ..E2eeConfig::default()
        };
        let ctx = E2eeContext::mit_config(config).unwrap();

        assert_eq!(ctx.mit_naechstem_zaehler(Ok).unwrap(), 0);
        assert_eq!(ctx.mit_naechstem_zaehler(Ok).unwrap(), 1);
        assert!(matches!(
            ctx.mit_naechstem_zaehler(Ok),
            Err(CryptoError::ZaehlerErschoepft { limit: 2 })
        ));
        assert_eq!(ctx.frame_counter(), 2);
    }

    #[test]
    fn debug_zeigt_keine_schluessel() {
        let ctx = E2eeContext::new().unwrap();
        let text = format!("{ctx:?}");
        assert!(text.contains("keyed: false"));
        assert!(text.contains("frame_counter: 0"));
    }
}
