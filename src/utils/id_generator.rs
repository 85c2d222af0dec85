//! Time-ordered record identifiers.
//!
//! [`UuidV7Generator`] produces RFC 9562 version 7 UUIDs: a 48-bit Unix
//! millisecond timestamp, a 12-bit sequence counter and 62 random bits. The
//! timestamp prefix keeps primary-key inserts close together in the index;
//! the counter keeps ids strictly increasing for one generator instance even
//! when several are issued in the same millisecond or the clock steps back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::{Builder, Uuid};

use crate::error::{Error, Result};

/// Retries after the first failed attempt, unless configured otherwise.
pub const DEFAULT_ID_RETRIES: u32 = 1;

const COUNTER_BITS: u32 = 12;
const COUNTER_MASK: u64 = (1 << COUNTER_BITS) - 1;
/// Fresh milliseconds start the counter in the lower half of its range so a
/// burst within one millisecond has room to grow before borrowing the next.
const COUNTER_SEED_MASK: u64 = COUNTER_MASK >> 1;

/// Failure reading the clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("system clock is before the Unix epoch")]
    BeforeEpoch,
    #[error("clock unavailable: {0}")]
    Unavailable(String),
}

/// Source of wall-clock time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn unix_millis(&self) -> std::result::Result<u64, ClockError>;
}

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_millis(&self) -> std::result::Result<u64, ClockError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ClockError::BeforeEpoch)?;
        Ok(elapsed.as_millis() as u64)
    }
}

/// Produces unique, time-ordered record identifiers.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Unavailable`] once the retry budget is
    /// spent without a successful generation.
    fn generate(&self) -> Result<Uuid>;
}

/// Monotonic UUIDv7 generator with a bounded retry budget.
pub struct UuidV7Generator<C: Clock = SystemClock> {
    clock: C,
    retries: u32,
    /// Last issued `(millis << 12) | counter`.
    last: AtomicU64,
}

impl UuidV7Generator<SystemClock> {
    /// Generator on the system clock with [`DEFAULT_ID_RETRIES`].
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_ID_RETRIES)
    }

    /// Generator on the system clock with a custom retry budget.
    pub fn with_retries(retries: u32) -> Self {
        Self::with_clock(SystemClock, retries)
    }
}

impl Default for UuidV7Generator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> UuidV7Generator<C> {
    pub fn with_clock(clock: C, retries: u32) -> Self {
        Self {
            clock,
            retries,
            last: AtomicU64::new(0),
        }
    }

    fn try_generate(&self) -> std::result::Result<Uuid, String> {
        let now = self.clock.unix_millis().map_err(|e| e.to_string())?;

        let mut random = [0u8; 10];
        getrandom::fill(&mut random).map_err(|e| format!("entropy source failed: {e}"))?;

        let seed = u64::from(u16::from_be_bytes([random[8], random[9]])) & COUNTER_SEED_MASK;
        let candidate = (now << COUNTER_BITS) | seed;

        let mut current = self.last.load(Ordering::Relaxed);
        let next = loop {
            // Same or earlier millisecond: continue from the last value.
            // Counter overflow carries into the timestamp field.
            let next = if candidate > current {
                candidate
            } else {
                current + 1
            };
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break next,
                Err(actual) => current = actual,
            }
        };

        Ok(encode_v7(next >> COUNTER_BITS, next & COUNTER_MASK, &random))
    }
}

impl<C: Clock> IdGenerator for UuidV7Generator<C> {
    fn generate(&self) -> Result<Uuid> {
        const OP: &str = "id_generator.generate";

        let attempts = self.retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.try_generate() {
                Ok(id) => return Ok(id),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "id generation attempt failed");
                    last_error = e;
                }
            }
        }

        Err(Error::unavailable(
            OP,
            format!("uuid v7 generation failed after {attempts} attempts: {last_error}"),
        ))
    }
}

/// Builds a version 7 UUID with the counter in the `rand_a` field.
fn encode_v7(millis: u64, counter: u64, random: &[u8; 10]) -> Uuid {
    let mut packed = [0u8; 10];
    packed[0] = (counter >> 8) as u8;
    packed[1] = counter as u8;
    packed[2..].copy_from_slice(&random[..8]);
    Builder::from_unix_timestamp_millis(millis, &packed).into_uuid()
}
