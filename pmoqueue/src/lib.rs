//! # pmoqueue - File de lecture indexée avec pré-chargement en cache
//!
//! Cette crate fournit une playlist ordonnée et adressable par index :
//! - Ajout en fin de file avec attribution d'index contigus
//! - Suppression par index avec compactage (l'ordre relatif est conservé)
//! - Morceau courant optionnel, effacé ou renuméroté automatiquement
//! - Mise en cache en arrière-plan des morceaux ajoutés
//!
//! # Architecture
//!
//! - **Playlist** : handle partagé, accès exclusif aux mutations (RwLock)
//! - **PlaylistCore** : conteneur synchrone (index, compactage, curseur)
//! - **CacheWorker** : file d'épisodes de cache exécutés un par un, chacun
//!   avec au plus 3 chargements simultanés
//! - **Song** : capacité minimale attendue d'un morceau (`is_cached`,
//!   `load_to_cache`)
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use pmoqueue::{Playlist, Song};
//! use std::sync::Arc;
//!
//! #[derive(PartialEq)]
//! struct Track(String);
//!
//! impl Song for Track {
//!     fn is_cached(&self) -> bool {
//!         false
//!     }
//!
//!     fn load_to_cache(&self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> pmoqueue::Result<()> {
//! let playlist = Playlist::new()?;
//!
//! // Indexés immédiatement, chargés en cache en arrière-plan
//! playlist
//!     .add_songs(vec![Arc::new(Track("a".into())), Arc::new(Track("b".into()))])
//!     .await;
//!
//! playlist.set_current_index(Some(1)).await?;
//! playlist.remove_songs([0]).await;
//! assert_eq!(playlist.current_index().await, Some(0));
//!
//! // Attendre les chargements en cours
//! playlist.cache_worker().flush().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
mod playlist;
mod song;
mod worker;

// Réexports publics
pub use config::QueueConfig;
pub use error::{Error, Result};
pub use playlist::core::PlaylistCore;
pub use playlist::Playlist;
pub use song::Song;
pub use worker::{CacheEvent, CacheWorker};
