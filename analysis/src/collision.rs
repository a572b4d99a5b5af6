use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use kl_sponge::{ConfigError, SpongeConfig, keccak_hash};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, instrument};

pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 200;

/// Probability of at least one collision among `attempts` uniformly random `digest_len`-byte
/// digests, by the birthday approximation `1 - exp(-k^2 / 2N)` with `N = 2^(8 * digest_len)`.
/// Saturates at 1 once `attempts` exceeds `N`.
#[must_use]
pub fn collision_probability(attempts: u64, digest_len: usize) -> f64 {
    let space = (8.0 * digest_len as f64).exp2();
    let attempts = attempts as f64;
    if attempts > space {
        return 1.0;
    }
    1.0 - (-(attempts * attempts) / (2.0 * space)).exp()
}

/// The sponge configuration used for collision searches: capacity 512, or 64 for states of
/// 512 bits or fewer.
pub fn collision_config(width: u32, rounds: usize) -> Result<SpongeConfig, ConfigError> {
    let state_bits = (width as usize).saturating_mul(25);
    let capacity_bits = if state_bits > 512 { 512 } else { 64 };
    SpongeConfig::new(
        width,
        rounds,
        state_bits.saturating_sub(capacity_bits),
        capacity_bits,
    )
}

/// Two different inputs with the same digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
    pub digest: Vec<u8>,
    /// Number of inputs hashed, the colliding one included.
    pub attempts: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Progress {
    pub attempts: u64,
    /// [`collision_probability`] for this many attempts.
    pub probability: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    Found(Collision),
    /// The attempt limit was reached without a collision.
    Exhausted { attempts: u64 },
    Cancelled { attempts: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent {
    Progress(Progress),
    Finished(SearchOutcome),
}

/// A birthday search for two random inputs whose truncated digests agree.
///
/// Every attempt hashes a fresh random `input_len`-byte input with its own sponge and keeps
/// the first `digest_len` output bytes. Inputs come from a `SmallRng` seeded with `seed`, so a
/// search is reproducible. Drawing the same input twice does not count as a collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionSearch {
    pub config: SpongeConfig,
    pub input_len: usize,
    pub digest_len: usize,
    pub max_attempts: u64,
    pub seed: u64,
    /// Progress is reported after the first attempt and then every `progress_interval`
    /// attempts. Zero reports only the first.
    pub progress_interval: u64,
}

impl CollisionSearch {
    #[must_use]
    pub const fn new(config: SpongeConfig, input_len: usize, digest_len: usize) -> Self {
        Self {
            config,
            input_len,
            digest_len,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Runs the search on the current thread until a collision is found, `max_attempts`
    /// inputs have been hashed, or `cancel` is set.
    #[instrument(
        skip_all,
        fields(
            width = %self.config.width(),
            rounds = self.config.rounds(),
            input_len = self.input_len,
            digest_len = self.digest_len,
            seed = self.seed,
        )
    )]
    pub fn run<F>(&self, cancel: &AtomicBool, mut on_progress: F) -> SearchOutcome
    where
        F: FnMut(Progress),
    {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut seen: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
        let mut input = vec![0u8; self.input_len];

        for attempt in 1..=self.max_attempts {
            if cancel.load(Ordering::Relaxed) {
                info!(attempts = attempt - 1, "collision search cancelled");
                return SearchOutcome::Cancelled {
                    attempts: attempt - 1,
                };
            }

            rng.fill(&mut input[..]);
            let digest = keccak_hash(self.config, &input, self.digest_len);
            match seen.entry(digest) {
                Entry::Occupied(entry) if *entry.get() != input => {
                    info!(attempts = attempt, "collision found");
                    return SearchOutcome::Found(Collision {
                        first: entry.get().clone(),
                        second: input,
                        digest: entry.key().clone(),
                        attempts: attempt,
                    });
                }
                Entry::Occupied(_) => debug!(attempts = attempt, "input drawn twice"),
                Entry::Vacant(entry) => {
                    entry.insert(input.clone());
                }
            }

            if attempt == 1
                || (self.progress_interval != 0 && attempt % self.progress_interval == 0)
            {
                on_progress(Progress {
                    attempts: attempt,
                    probability: collision_probability(attempt, self.digest_len),
                });
            }
        }

        info!(attempts = self.max_attempts, "attempt limit reached");
        SearchOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// Runs the search on a worker thread, streaming progress and the final outcome over a
    /// channel.
    #[must_use]
    pub fn spawn(self) -> SearchHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, events) = mpsc::channel();

        let flag = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            let outcome = self.run(&flag, |progress| {
                // The receiver may have been dropped; the search still runs to completion.
                let _ = sender.send(SearchEvent::Progress(progress));
            });
            let _ = sender.send(SearchEvent::Finished(outcome.clone()));
            outcome
        });

        SearchHandle {
            cancel,
            events,
            worker,
        }
    }
}

impl Default for CollisionSearch {
    /// Full-strength 64-bit lanes, 16-byte inputs and a 2-byte digest.
    fn default() -> Self {
        Self::new(SpongeConfig::SHA3_256, 16, 2)
    }
}

/// A search running on a worker thread.
#[derive(Debug)]
pub struct SearchHandle {
    cancel: Arc<AtomicBool>,
    events: Receiver<SearchEvent>,
    worker: JoinHandle<SearchOutcome>,
}

impl SearchHandle {
    /// Asks the worker to stop before its next attempt.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// A flag that cancels the search when set, for handing to other threads.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    #[must_use]
    pub const fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Waits for the worker and returns its outcome. Fails only if the worker panicked.
    pub fn join(self) -> thread::Result<SearchOutcome> {
        self.worker.join()
    }
}
