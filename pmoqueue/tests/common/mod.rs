//! Morceaux de test instrumentés
#![allow(dead_code)]

use pmoqueue::{CacheEvent, CacheWorker, Playlist, QueueConfig, Song};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Compteurs partagés entre plusieurs morceaux
#[derive(Debug, Default)]
pub struct LoadGauge {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started: AtomicUsize,
}

impl LoadGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct TestSong {
    pub name: String,
    cached: AtomicBool,
    loads: AtomicUsize,
    delay: Duration,
    failing: bool,
    gauge: Arc<LoadGauge>,
}

impl TestSong {
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, false, Duration::ZERO, false, LoadGauge::new())
    }

    pub fn cached(name: &str) -> Arc<Self> {
        Self::build(name, true, Duration::ZERO, false, LoadGauge::new())
    }

    pub fn slow(name: &str, delay: Duration, gauge: &Arc<LoadGauge>) -> Arc<Self> {
        Self::build(name, false, delay, false, gauge.clone())
    }

    pub fn failing(name: &str, gauge: &Arc<LoadGauge>) -> Arc<Self> {
        Self::build(name, false, Duration::ZERO, true, gauge.clone())
    }

    fn build(
        name: &str,
        cached: bool,
        delay: Duration,
        failing: bool,
        gauge: Arc<LoadGauge>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cached: AtomicBool::new(cached),
            loads: AtomicUsize::new(0),
            delay,
            failing,
            gauge,
        })
    }

    /// Simule un chargement effectué hors de la playlist
    pub fn mark_cached(&self) {
        self.cached.store(true, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl PartialEq for TestSong {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Song for TestSong {
    fn is_cached(&self) -> bool {
        self.cached.load(Ordering::SeqCst)
    }

    fn load_to_cache(&self) -> anyhow::Result<()> {
        self.gauge.enter();
        std::thread::sleep(self.delay);
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.gauge.leave();

        if self.failing {
            anyhow::bail!("unable to fetch {}", self.name);
        }
        self.cached.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn songs(names: &[&str]) -> Vec<Arc<TestSong>> {
    names.iter().map(|n| TestSong::new(n)).collect()
}

pub fn names(songs: &[Arc<TestSong>]) -> Vec<String> {
    songs.iter().map(|s| s.name.clone()).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Playlist sur un worker local au runtime du test
pub fn playlist() -> Playlist<TestSong> {
    init_tracing();
    Playlist::with_worker(CacheWorker::spawn(&QueueConfig::default()))
}

/// Collecte les évènements jusqu'à la fin des épisodes `ids`
pub async fn collect_until_finished(
    rx: &mut broadcast::Receiver<CacheEvent>,
    ids: &[u64],
) -> Vec<CacheEvent> {
    let mut events = Vec::new();
    let mut remaining: Vec<u64> = ids.to_vec();

    let collect = async {
        while !remaining.is_empty() {
            match rx.recv().await {
                Ok(event) => {
                    if let CacheEvent::EpisodeFinished { id, .. } = &event {
                        remaining.retain(|r| r != id);
                    }
                    events.push(event);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(10), collect)
        .await
        .expect("caching episodes did not finish in time");
    events
}
