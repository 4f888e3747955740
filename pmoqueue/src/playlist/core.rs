//! PlaylistCore : conteneur ordonné avec compactage et curseur courant

use crate::{Error, Result};
use std::ops::Range;
use std::sync::Arc;

/// Noyau de la playlist (structure interne protégée par RwLock)
///
/// Les morceaux sont rangés dans des emplacements indexés. Une suppression
/// laisse un emplacement vide qui disparaît au compactage ; toute opération
/// publique rend le noyau compacté (emplacements `0..len` tous occupés).
pub struct PlaylistCore<S> {
    slots: Vec<Option<Arc<S>>>,
    current: Option<usize>,
}

impl<S> Default for PlaylistCore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> PlaylistCore<S> {
    /// Crée un noyau vide, sans morceau courant
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: None,
        }
    }

    /// Ajoute des morceaux en fin de playlist
    ///
    /// Le premier reçoit `max + 1` (ou 0 si la playlist est vide), les
    /// suivants les index consécutifs. Retourne les index attribués.
    pub fn push_all<I>(&mut self, songs: I) -> Range<usize>
    where
        I: IntoIterator<Item = Arc<S>>,
    {
        let start = self.next_index();
        self.slots.truncate(start);
        self.slots.extend(songs.into_iter().map(Some));
        start..self.slots.len()
    }

    /// Supprime les morceaux aux index donnés puis compacte
    ///
    /// Les doublons et les index absents sont ignorés. Si le morceau courant
    /// est supprimé, le curseur est effacé. Retourne le nombre de morceaux
    /// effectivement retirés.
    pub fn remove<I>(&mut self, indexes: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let mut removed = 0;
        for index in indexes {
            if self.current == Some(index) {
                self.current = None;
            }
            if let Some(slot) = self.slots.get_mut(index) {
                if slot.take().is_some() {
                    removed += 1;
                }
            }
        }
        self.compact();
        removed
    }

    /// Reconstruit un espace d'index contigu `0..m`
    ///
    /// Les survivants sont parcourus par ancien index croissant et reçoivent
    /// 0, 1, 2... dans cet ordre. Le curseur suit son morceau.
    pub fn compact(&mut self) {
        let previous = std::mem::take(&mut self.slots);
        let mut remapped = None;

        for (old_index, slot) in previous.into_iter().enumerate() {
            if let Some(song) = slot {
                if self.current == Some(old_index) {
                    remapped = Some(self.slots.len());
                }
                self.slots.push(Some(song));
            }
        }

        self.current = remapped;
    }

    /// Vide complètement la playlist
    pub fn clear(&mut self) {
        self.slots.clear();
        self.current = None;
    }

    /// Nombre de morceaux
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Vérifie si la playlist est vide
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Récupère un morceau par index
    pub fn get(&self, index: usize) -> Option<&Arc<S>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Vérifie qu'un emplacement est occupé
    pub fn contains_index(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Parcourt les morceaux par index croissant
    pub fn iter(&self) -> impl Iterator<Item = &Arc<S>> + '_ {
        self.slots.iter().flatten()
    }

    /// Snapshot de tous les morceaux
    pub fn snapshot(&self) -> Vec<Arc<S>> {
        self.iter().cloned().collect()
    }

    /// Index courant
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Change l'index courant (doit désigner un emplacement existant)
    pub fn set_current(&mut self, index: Option<usize>) -> Result<()> {
        match index {
            Some(i) if !self.contains_index(i) => Err(Error::IndexNotFound(i)),
            _ => {
                self.current = index;
                Ok(())
            }
        }
    }

    /// Morceau courant
    pub fn current_song(&self) -> Option<&Arc<S>> {
        self.current.and_then(|i| self.get(i))
    }

    pub fn can_play_next(&self) -> bool {
        self.current
            .and_then(|i| i.checked_add(1))
            .is_some_and(|next| self.contains_index(next))
    }

    pub fn can_play_previous(&self) -> bool {
        self.current
            .and_then(|i| i.checked_sub(1))
            .is_some_and(|previous| self.contains_index(previous))
    }

    fn next_index(&self) -> usize {
        self.slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |max| max + 1)
    }
}

impl<S: PartialEq> PlaylistCore<S> {
    /// Index (croissants) des morceaux appartenant à `songs`
    pub fn indexes_of<'a>(&'a self, songs: &'a [Arc<S>]) -> impl Iterator<Item = usize> + 'a {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| match slot {
                Some(song) if songs.iter().any(|wanted| **wanted == **song) => Some(index),
                _ => None,
            })
    }

    /// Vérifie si un morceau est présent
    pub fn contains(&self, song: &S) -> bool {
        self.iter().any(|s| **s == *song)
    }
}
