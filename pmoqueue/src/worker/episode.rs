//! CacheEpisode : chargement en cache des morceaux d'un ajout

use super::event::CacheEvent;
use crate::Song;
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Unité de travail soumise au worker de cache
///
/// Contient les morceaux d'un même appel à `add_songs` qui n'étaient pas
/// en cache au moment de l'ajout.
pub(crate) struct CacheEpisode {
    id: u64,
    songs: Vec<Arc<dyn Song>>,
}

impl CacheEpisode {
    pub(crate) fn new(id: u64, songs: Vec<Arc<dyn Song>>) -> Self {
        Self { id, songs }
    }

    /// Charge les morceaux avec au plus `parallelism` chargements simultanés
    ///
    /// Un échec (erreur ou panique) n'interrompt pas les autres chargements.
    pub(crate) async fn run(self, parallelism: usize, events: &broadcast::Sender<CacheEvent>) {
        let id = self.id;
        let total = self.songs.len();

        info!(episode = id, songs = total, "Caching episode started");
        let _ = events.send(CacheEvent::EpisodeStarted { id, songs: total });

        let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
        let mut tasks = JoinSet::new();

        for song in self.songs {
            // Le sémaphore n'est jamais fermé
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            tasks.spawn_blocking(move || {
                let _permit = permit;
                song.load_to_cache()
            });
        }

        let mut cached = 0;
        let mut failed = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {
                    cached += 1;
                    let _ = events.send(CacheEvent::SongCached { id });
                }
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(episode = id, "Failed to load song into cache: {:#}", e);
                    let _ = events.send(CacheEvent::SongFailed {
                        id,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    failed += 1;
                    warn!(episode = id, "Cache load task aborted: {}", e);
                    let _ = events.send(CacheEvent::SongFailed {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(episode = id, cached, failed, "Caching episode finished");
        let _ = events.send(CacheEvent::EpisodeFinished { id, cached, failed });
    }
}
