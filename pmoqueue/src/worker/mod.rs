//! CacheWorker : exécution en arrière-plan des épisodes de cache
//!
//! Chaque appel à `Playlist::add_songs` soumet un épisode dans une file
//! consommée par une unique tâche. Cette tâche déroule un épisode en entier
//! avant de prendre le suivant, dans l'ordre de soumission. La phase de
//! chargement d'un épisode est en plus gardée par un verrou global au
//! processus : deux workers distincts ne chargent jamais en même temps.

mod episode;
mod event;

use episode::CacheEpisode;
pub use event::CacheEvent;

use crate::config::{
    QueueConfig, DEFAULT_CACHE_PARALLELISM, MAX_CACHE_PARALLELISM, MAX_EVENT_CAPACITY,
};
use crate::{Error, Result, Song};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Semaphore};

/// Worker partagé par toutes les playlists créées avec `Playlist::new()`
static GLOBAL_WORKER: OnceCell<CacheWorker> = OnceCell::new();

/// Un seul épisode en cours de chargement dans tout le processus
static EPISODE_GATE: Semaphore = Semaphore::const_new(1);

/// Travail en attente dans la file du worker
enum Job {
    Episode(CacheEpisode),
    Barrier(oneshot::Sender<()>),
}

struct WorkerInner {
    tx: mpsc::UnboundedSender<Job>,
    events: broadcast::Sender<CacheEvent>,
    next_episode: AtomicU64,
    parallelism: usize,
}

/// Handle vers un worker de cache (clonable, partageable)
#[derive(Clone)]
pub struct CacheWorker {
    inner: Arc<WorkerInner>,
}

impl CacheWorker {
    /// Démarre un worker sur le runtime tokio courant
    ///
    /// La tâche s'arrête quand le dernier handle est libéré.
    pub fn spawn(config: &QueueConfig) -> Self {
        let (worker, rx) = Self::channel(config);
        tokio::spawn(run(rx, worker.inner.events.clone(), worker.inner.parallelism));
        worker
    }

    /// Retourne le worker global (démarré au premier appel)
    ///
    /// Il tourne sur un thread dédié avec son propre runtime, indépendamment
    /// du runtime de l'appelant.
    pub fn global() -> Result<&'static CacheWorker> {
        GLOBAL_WORKER.get_or_try_init(|| -> Result<CacheWorker> {
            let config = QueueConfig::load(None).unwrap_or_else(|e| {
                tracing::warn!("Invalid queue configuration ({}), using defaults", e);
                QueueConfig::default()
            });
            warn_custom_parallelism(&config);

            let (worker, rx) = Self::channel(&config);
            let events = worker.inner.events.clone();
            let parallelism = worker.inner.parallelism;

            std::thread::Builder::new()
                .name("pmoqueue-cache".into())
                .spawn(move || {
                    match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(runtime) => runtime.block_on(run(rx, events, parallelism)),
                        Err(e) => tracing::error!("Failed to start cache worker runtime: {}", e),
                    }
                })
                .map_err(|e| Error::WorkerUnavailable(e.to_string()))?;

            Ok(worker)
        })
    }

    fn channel(config: &QueueConfig) -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            inner: Arc::new(WorkerInner {
                tx,
                events: broadcast::channel(
                    config.cache.event_capacity.clamp(1, MAX_EVENT_CAPACITY),
                )
                .0,
                next_episode: AtomicU64::new(1),
                parallelism: config.cache.parallelism.clamp(1, MAX_CACHE_PARALLELISM),
            }),
        };
        (worker, rx)
    }

    /// Soumet un épisode et retourne son identifiant
    ///
    /// Ne bloque pas. Si le worker est arrêté, l'épisode est abandonné.
    pub fn submit(&self, songs: Vec<Arc<dyn Song>>) -> u64 {
        let id = self.inner.next_episode.fetch_add(1, Ordering::SeqCst);
        let count = songs.len();

        let _ = self
            .inner
            .events
            .send(CacheEvent::EpisodeQueued { id, songs: count });

        if self
            .inner
            .tx
            .send(Job::Episode(CacheEpisode::new(id, songs)))
            .is_err()
        {
            tracing::warn!(episode = id, "Cache worker stopped, dropping episode");
        } else {
            tracing::debug!(episode = id, songs = count, "Caching episode queued");
        }

        id
    }

    /// Attend la fin de tous les épisodes soumis avant l'appel
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.inner
            .tx
            .send(Job::Barrier(done_tx))
            .map_err(|_| Error::WorkerUnavailable("cache worker stopped".into()))?;
        done_rx
            .await
            .map_err(|_| Error::WorkerUnavailable("cache worker stopped".into()))
    }

    /// S'abonne aux évènements du worker
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Nombre maximal de chargements simultanés par épisode
    pub fn parallelism(&self) -> usize {
        self.inner.parallelism
    }
}

impl std::fmt::Debug for CacheWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWorker")
            .field("parallelism", &self.inner.parallelism)
            .finish_non_exhaustive()
    }
}

/// Signale un worker global configuré hors de la valeur par défaut
///
/// Retourne `true` si un avertissement a été émis.
fn warn_custom_parallelism(config: &QueueConfig) -> bool {
    if config.cache.parallelism == DEFAULT_CACHE_PARALLELISM {
        return false;
    }
    tracing::warn!(
        parallelism = config.cache.parallelism,
        "Global cache worker running with non-default parallelism (expected {})",
        DEFAULT_CACHE_PARALLELISM
    );
    true
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Job>,
    events: broadcast::Sender<CacheEvent>,
    parallelism: usize,
) {
    tracing::debug!(parallelism, "Cache worker started");

    while let Some(job) = rx.recv().await {
        match job {
            Job::Episode(episode) => {
                // Le verrou n'est jamais fermé
                let Ok(_gate) = EPISODE_GATE.acquire().await else {
                    tracing::error!("Episode gate closed, stopping cache worker");
                    break;
                };
                episode.run(parallelism, &events).await;
            }
            Job::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Cache worker stopped");
}
