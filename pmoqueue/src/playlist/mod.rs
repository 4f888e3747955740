//! Playlist : file de lecture partagée avec mise en cache en arrière-plan

pub mod core;

use self::core::PlaylistCore;
use crate::worker::CacheWorker;
use crate::{Error, Result, Song};
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Playlist ordonnée, adressable par index, avec un morceau courant optionnel
///
/// Le handle est clonable : tous les clones partagent le même contenu.
/// Les mutations passent par le verrou en écriture du noyau, les lectures
/// par le verrou en lecture et retournent des copies. Le verrou n'est
/// jamais tenu pendant un chargement en cache.
pub struct Playlist<S: Song> {
    core: Arc<RwLock<PlaylistCore<S>>>,
    worker: CacheWorker,
}

impl<S: Song> Clone for Playlist<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            worker: self.worker.clone(),
        }
    }
}

impl<S: Song> Playlist<S> {
    /// Crée une playlist vide attachée au worker de cache global
    pub fn new() -> Result<Self> {
        Ok(Self::with_worker(CacheWorker::global()?.clone()))
    }

    /// Crée une playlist vide attachée à un worker donné
    pub fn with_worker(worker: CacheWorker) -> Self {
        Self {
            core: Arc::new(RwLock::new(PlaylistCore::new())),
            worker,
        }
    }

    /// Ajoute des morceaux en fin de playlist
    ///
    /// Retourne dès que les morceaux sont indexés ; les morceaux absents du
    /// cache sont confiés au worker sans attendre leur chargement.
    pub async fn add_songs<I>(&self, songs: I) -> Range<usize>
    where
        I: IntoIterator<Item = Arc<S>>,
    {
        let songs: Vec<Arc<S>> = songs.into_iter().collect();

        let mut core = self.core.write().await;
        let assigned = core.push_all(songs.iter().cloned());
        drop(core);

        tracing::debug!(
            first = assigned.start,
            count = assigned.len(),
            "Songs appended to playlist"
        );

        let pending: Vec<Arc<dyn Song>> = songs
            .into_iter()
            .filter(|song| !song.is_cached())
            .map(|song| song as Arc<dyn Song>)
            .collect();
        self.worker.submit(pending);

        assigned
    }

    /// Supprime les morceaux aux index donnés et compacte les index
    ///
    /// Les index absents ou répétés sont ignorés silencieusement.
    pub async fn remove_songs<I>(&self, indexes: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let mut core = self.core.write().await;
        let removed = core.remove(indexes);
        let remaining = core.len();
        let current = core.current();
        drop(core);

        tracing::debug!(removed, remaining, ?current, "Songs removed from playlist");
    }

    /// Vide la playlist
    pub async fn clear(&self) {
        self.core.write().await.clear();
    }

    /// Récupère le morceau à l'index donné
    pub async fn get(&self, index: usize) -> Result<Arc<S>> {
        let core = self.core.read().await;
        core.get(index).cloned().ok_or(Error::IndexNotFound(index))
    }

    /// Snapshot des morceaux par index croissant
    pub async fn songs(&self) -> Vec<Arc<S>> {
        self.core.read().await.snapshot()
    }

    /// Itérateur indépendant sur un snapshot de la playlist
    pub async fn iter(&self) -> std::vec::IntoIter<Arc<S>> {
        self.songs().await.into_iter()
    }

    pub async fn len(&self) -> usize {
        self.core.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.core.read().await.is_empty()
    }

    /// Index du morceau courant
    pub async fn current_index(&self) -> Option<usize> {
        self.core.read().await.current()
    }

    /// Change le morceau courant
    ///
    /// `Some(i)` doit désigner un morceau existant, sinon
    /// [`Error::IndexNotFound`] et le curseur reste inchangé.
    pub async fn set_current_index(&self, index: Option<usize>) -> Result<()> {
        self.core.write().await.set_current(index)
    }

    /// Morceau courant
    pub async fn current_song(&self) -> Option<Arc<S>> {
        self.core.read().await.current_song().cloned()
    }

    /// Vrai si un morceau courant existe et qu'un morceau le suit
    pub async fn can_play_next_song(&self) -> bool {
        self.core.read().await.can_play_next()
    }

    /// Vrai si un morceau courant existe et qu'un morceau le précède
    pub async fn can_play_previous_song(&self) -> bool {
        self.core.read().await.can_play_previous()
    }

    /// Worker de cache utilisé par cette playlist
    pub fn cache_worker(&self) -> &CacheWorker {
        &self.worker
    }
}

impl<S: Song + PartialEq> Playlist<S> {
    /// Index (croissants) des morceaux égaux à l'un de `songs`
    pub async fn indexes_of(&self, songs: &[Arc<S>]) -> std::vec::IntoIter<usize> {
        let core = self.core.read().await;
        let indexes: Vec<usize> = core.indexes_of(songs).collect();
        indexes.into_iter()
    }

    /// Vérifie si un morceau est présent
    pub async fn contains(&self, song: &S) -> bool {
        self.core.read().await.contains(song)
    }
}
