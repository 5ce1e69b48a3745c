//! # Candidate cache: the only shared mutable state of the engine.
//!
//! Holds the current generation of [`Candidate`]s behind one exclusive lock.
//!
//! ## Rules
//! - A generation is replaced **wholesale**; it is never edited in place.
//! - Readers see either the previous or the next generation, never a mix.
//! - The acquisition tick holds the lock (via [`CandidateCache::lock`]) for its
//!   whole iteration, so a replacement waits for it and vice versa.
//!
//! ```text
//! refresh:      build Vec<Candidate> (unlocked) ──► replace() ─┐
//!                                                             ▼
//!                                                [Mutex<Generation>]
//!                                                             ▲
//! acquisition:  lock() ── iterate guard ── drop ──────────────┘
//! ```

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::model::Candidate;

struct Generation {
    seq: u64,
    candidates: Arc<[Candidate]>,
}

/// Mutex-guarded, wholesale-replaced sequence of candidates.
pub struct CandidateCache {
    inner: Mutex<Generation>,
}

impl Default for CandidateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateCache {
    /// Creates an empty cache at generation 0.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generation {
                seq: 0,
                candidates: Arc::from(Vec::new()),
            }),
        }
    }

    /// Swaps in a new generation and returns its sequence number.
    pub async fn replace(&self, candidates: Vec<Candidate>) -> u64 {
        let mut current = self.inner.lock().await;
        current.seq += 1;
        current.candidates = Arc::from(candidates);
        current.seq
    }

    /// Returns the current generation; iterate it without further locking.
    pub async fn snapshot(&self) -> Arc<[Candidate]> {
        Arc::clone(&self.inner.lock().await.candidates)
    }

    /// Takes the lock and keeps it until the guard is dropped.
    pub async fn lock(&self) -> CacheGuard<'_> {
        CacheGuard {
            inner: self.inner.lock().await,
        }
    }

    /// Number of replacements so far.
    pub async fn generation(&self) -> u64 {
        self.inner.lock().await.seq
    }
}

/// Exclusive view of the current generation.
pub struct CacheGuard<'a> {
    inner: MutexGuard<'a, Generation>,
}

impl CacheGuard<'_> {
    pub fn generation(&self) -> u64 {
        self.inner.seq
    }
}

impl Deref for CacheGuard<'_> {
    type Target = [Candidate];

    fn deref(&self) -> &[Candidate] {
        &self.inner.candidates
    }
}
