//! Memoized note buffers.
//!
//! Generating a buffer is pure, so a note played twice with the same
//! parameters can reuse the first result. The cache key is the full
//! parameter tuple `(note class, octave, waveform, duration, sample rate)`,
//! compared exactly: `0.5` and `0.5000001` seconds are different keys.
//!
//! The cache is safe to share between threads. Each key owns a `OnceLock`,
//! so callers racing on the same key block on one generation instead of all
//! computing it. The map lock is never held while samples are generated.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, trace};

use crate::dsp::{oscillator, DspError, SampleBuffer, Waveform};
use crate::sequencing::notes::{NoteClass, Pitch};

/// Exact-match cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub class: NoteClass,
    pub octave: i32,
    pub waveform: Waveform,
    /// Bit pattern of the duration in seconds
    duration_bits: u64,
    pub sample_rate: u32,
}

impl CacheKey {
    pub fn new(pitch: Pitch, waveform: Waveform, duration: f64, sample_rate: u32) -> Self {
        Self {
            class: pitch.class,
            octave: pitch.octave,
            waveform,
            duration_bits: duration.to_bits(),
            sample_rate,
        }
    }

    pub fn duration(&self) -> f64 {
        f64::from_bits(self.duration_bits)
    }
}

/// Counters describing cache activity since construction (or the last
/// `clear`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Buffers actually generated
    pub generations: u64,
    pub evictions: u64,
}

type Slot = Arc<OnceLock<SampleBuffer>>;

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Slot>,
    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,
}

pub struct BufferCache {
    inner: Mutex<CacheInner>,
    /// `None` = unbounded
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    generations: AtomicU64,
    evictions: AtomicU64,
}

impl BufferCache {
    /// Cache that keeps every buffer until `clear`.
    pub fn unbounded() -> Self {
        Self::build(None)
    }

    /// Cache holding at most `capacity` buffers, evicting the oldest first.
    /// A capacity of 0 disables storage (every call generates).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity))
    }

    /// `None` for unbounded, `Some(n)` for a bounded cache.
    pub fn new(capacity: Option<usize>) -> Self {
        Self::build(capacity)
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            generations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Return the buffer for this note, generating it on first use.
    ///
    /// Invalid parameters are rejected before the cache is touched, so
    /// failures are never stored.
    pub fn get_or_generate(
        &self,
        pitch: Pitch,
        waveform: Waveform,
        duration: f64,
        sample_rate: u32,
    ) -> Result<SampleBuffer, DspError> {
        let frequency = pitch.frequency();
        oscillator::validate(frequency, sample_rate)?;
        oscillator::validate_duration(duration, sample_rate)?;

        let key = CacheKey::new(pitch, waveform, duration, sample_rate);
        let slot = self.slot_for(key);

        let buffer = slot.get_or_init(|| {
            self.generations.fetch_add(1, Ordering::Relaxed);
            debug!(
                note = %pitch,
                %waveform,
                duration,
                sample_rate,
                "generating note buffer"
            );
            oscillator::render_buffer(waveform, frequency, duration, sample_rate)
        });

        Ok(buffer.clone())
    }

    fn slot_for(&self, key: CacheKey) -> Slot {
        let mut inner = self.lock();

        if let Some(slot) = inner.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(?key, "buffer cache hit");
            return slot.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let slot = Slot::default();

        if self.capacity == Some(0) {
            return slot;
        }

        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(key = ?oldest, "evicted buffer");
            }
        }

        inner.entries.insert(key, slot.clone());
        inner.order.push_back(key);
        slot
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored buffer and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.generations.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    // The map stays consistent even if a holder panicked, so poisoning is
    // ignored.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BufferCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for BufferCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}
