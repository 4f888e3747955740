//! Song : capacité minimale attendue d'un morceau par la playlist
//!
//! La playlist ne connaît ni l'identité ni les métadonnées d'un morceau.
//! Elle a seulement besoin de savoir s'il est déjà en cache et de pouvoir
//! lui demander de s'y charger.

/// Un morceau manipulé par la playlist.
///
/// L'égalité (`PartialEq`) du type concret définit l'identité utilisée par
/// [`Playlist::indexes_of`](crate::Playlist::indexes_of) et
/// [`Playlist::contains`](crate::Playlist::contains).
///
/// # Exemple
///
/// ```
/// use pmoqueue::Song;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Debug)]
/// struct LocalTrack {
///     path: String,
///     cached: AtomicBool,
/// }
///
/// impl PartialEq for LocalTrack {
///     fn eq(&self, other: &Self) -> bool {
///         self.path == other.path
///     }
/// }
///
/// impl Song for LocalTrack {
///     fn is_cached(&self) -> bool {
///         self.cached.load(Ordering::SeqCst)
///     }
///
///     fn load_to_cache(&self) -> anyhow::Result<()> {
///         // copie du fichier vers le cache...
///         self.cached.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Song: Send + Sync + 'static {
    /// Indique si le morceau est déjà présent dans le cache.
    ///
    /// Une fois `true`, doit le rester.
    fn is_cached(&self) -> bool;

    /// Charge le morceau dans le cache.
    ///
    /// Appel bloquant, exécuté hors du runtime async par le worker de cache.
    /// Doit être idempotent : sans effet si le morceau est déjà en cache.
    /// Une erreur est journalisée par le worker mais jamais réessayée.
    fn load_to_cache(&self) -> anyhow::Result<()>;
}
