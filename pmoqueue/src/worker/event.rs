//! Évènements émis par le worker de cache

/// Évènement de cycle de vie d'un épisode de cache
///
/// Diffusé via [`CacheWorker::subscribe`](super::CacheWorker::subscribe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Épisode placé dans la file du worker
    EpisodeQueued { id: u64, songs: usize },
    /// Début de la phase de chargement parallèle
    EpisodeStarted { id: u64, songs: usize },
    /// Un morceau de l'épisode est en cache
    SongCached { id: u64 },
    /// Le chargement d'un morceau a échoué (non réessayé)
    SongFailed { id: u64, error: String },
    /// Fin de l'épisode
    EpisodeFinished { id: u64, cached: usize, failed: usize },
}

impl CacheEvent {
    /// Identifiant de l'épisode concerné
    pub fn episode_id(&self) -> u64 {
        match self {
            CacheEvent::EpisodeQueued { id, .. }
            | CacheEvent::EpisodeStarted { id, .. }
            | CacheEvent::SongCached { id }
            | CacheEvent::SongFailed { id, .. }
            | CacheEvent::EpisodeFinished { id, .. } => *id,
        }
    }
}
