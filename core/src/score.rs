use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::*;

/// Number of tiers that keep a best time.
pub const SCORE_SLOTS: usize = Difficulty::PRESETS.len();

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Score storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed score record: {0}")]
    Format(#[from] serde_json::Error),
    #[error("No home directory to keep scores in")]
    NoHome,
}

/// Blob storage for the persisted best-time record.
pub trait ScoreStore {
    fn load(&self) -> core::result::Result<Vec<u8>, StoreError>;
    fn save(&mut self, blob: &[u8]) -> core::result::Result<(), StoreError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn load(&self) -> core::result::Result<Vec<u8>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, blob: &[u8]) -> core::result::Result<(), StoreError> {
        (**self).save(blob)
    }
}

/// Scores kept in a single file, by default `.minescores` in the user's home.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub const FILE_NAME: &'static str = ".minescores";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_home() -> core::result::Result<Self, StoreError> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .ok_or(StoreError::NoHome)?;
        Ok(Self::new(Path::new(&home).join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileStore {
    fn load(&self) -> core::result::Result<Vec<u8>, StoreError> {
        Ok(std::fs::read(&self.path)?)
    }

    fn save(&mut self, blob: &[u8]) -> core::result::Result<(), StoreError> {
        Ok(std::fs::write(&self.path, blob)?)
    }
}

/// In-memory blob, clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> core::result::Result<Vec<u8>, StoreError> {
        self.blob()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound).into())
    }

    fn save(&mut self, blob: &[u8]) -> core::result::Result<(), StoreError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_vec());
        Ok(())
    }
}

/// Stored form of a best time, JSON has no infinity so an unset slot is `null`.
fn encode(seconds: f64) -> Option<f64> {
    seconds.is_finite().then_some(seconds)
}

fn decode(seconds: Option<f64>) -> f64 {
    match seconds {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => seconds,
        _ => f64::INFINITY,
    }
}

/// Best completion time per preset tier, lower is better.
#[derive(Debug)]
pub struct ScoreBoard<S> {
    best: [f64; SCORE_SLOTS],
    store: S,
}

impl<S: ScoreStore> ScoreBoard<S> {
    /// Loads the persisted record, any failure falls back to no scores at all.
    pub fn load(store: S) -> Self {
        let best = match Self::read(&store) {
            Ok(best) => best,
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No saved scores yet");
                [f64::INFINITY; SCORE_SLOTS]
            }
            Err(err) => {
                log::warn!("Could not load scores, starting fresh: {}", err);
                [f64::INFINITY; SCORE_SLOTS]
            }
        };
        Self { best, store }
    }

    fn read(store: &S) -> core::result::Result<[f64; SCORE_SLOTS], StoreError> {
        let blob = store.load()?;
        let record: [Option<f64>; SCORE_SLOTS] = serde_json::from_slice(&blob)?;
        Ok(record.map(decode))
    }

    fn write(&mut self) -> core::result::Result<(), StoreError> {
        let blob = serde_json::to_vec(&self.best.map(encode))?;
        self.store.save(&blob)
    }

    /// Best time in seconds, infinite when unset or for custom fields.
    pub fn best_time(&self, difficulty: Difficulty) -> f64 {
        difficulty
            .score_slot()
            .map_or(f64::INFINITY, |slot| self.best[slot])
    }

    pub fn is_new_best(&self, seconds: f64, difficulty: Difficulty) -> bool {
        difficulty.score_slot().is_some() && seconds < self.best_time(difficulty)
    }

    /// Overwrites the slot and persists the whole record; a failed save only gets logged.
    pub fn record_best(&mut self, seconds: f64, difficulty: Difficulty) {
        let Some(slot) = difficulty.score_slot() else {
            log::debug!("Custom fields keep no score");
            return;
        };
        self.best[slot] = seconds;
        log::info!(
            "New best time for {}: {:.2} seconds",
            difficulty.name(),
            seconds
        );
        if let Err(err) = self.write() {
            log::error!("Could not save scores: {}", err);
        }
    }

    /// Every preset with its best time, for a top-scores listing.
    pub fn entries(&self) -> impl Iterator<Item = (Difficulty, f64)> + '_ {
        Difficulty::PRESETS
            .into_iter()
            .map(|difficulty| (difficulty, self.best_time(difficulty)))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
