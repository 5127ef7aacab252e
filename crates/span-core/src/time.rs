//! Time model and the injected clock capability.
//!
//! # Design
//!
//! Absolute instants are `Timestamp` values — seconds since the Unix epoch as
//! `f64`, because every travel time in the graph is a fractional-second
//! duration and ETA arithmetic is pure addition.  Civil-time breakdown
//! (hour-of-day, weekday) goes through the [`Clock`] trait so the scoring
//! pipeline never reads the ambient process clock: tests inject a
//! [`FixedClock`] and every time-of-day and bucket computation becomes
//! reproducible.
//!
//! Civil time is derived with plain integer arithmetic from a UTC offset
//! (days since epoch; epoch day was a Thursday).  No datetime dependency —
//! the engine only ever needs hour, minute, and weekday.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// An absolute instant: seconds since the Unix epoch.
///
/// Durations throughout the engine are plain `f64` seconds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0.0);

    /// The instant `secs` seconds after `self`.
    #[inline]
    pub fn offset_secs(self, secs: f64) -> Timestamp {
        Timestamp(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn unix_secs(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{:.3}", self.0)
    }
}

// ── LocalTime ─────────────────────────────────────────────────────────────────

/// Civil-time breakdown of an instant, as produced by a [`Clock`].
///
/// `day_of_week` is 0 = Monday … 6 = Sunday.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day_of_week: u32,
}

impl LocalTime {
    /// Minutes since local midnight, in `0..1440`.
    #[inline]
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Index of the 5-minute window of the day: `hour * 12 + minute / 5`,
    /// in `0..288`.  Keys the feature cache and the feature seed.
    #[inline]
    pub fn five_minute_bucket(&self) -> u32 {
        self.hour * 12 + self.minute / 5
    }

    /// Saturday or Sunday.
    #[inline]
    pub fn is_weekend(&self) -> bool {
        self.day_of_week >= 5
    }

    /// The traffic regime this instant falls into.
    #[inline]
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.hour)
    }
}

// ── TimeOfDay ─────────────────────────────────────────────────────────────────

/// Traffic regime by local hour, with its travel-time multiplier.
///
/// | Window (local hour) | Variant       | Multiplier |
/// |---------------------|---------------|------------|
/// | 05:00–08:59         | `MorningRush` | 1.3        |
/// | 09:00–15:59         | `Midday`      | 1.1        |
/// | 16:00–18:59         | `EveningRush` | 1.3        |
/// | 19:00–21:59         | `Evening`     | 1.0        |
/// | 22:00–04:59         | `LateNight`   | 0.9        |
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeOfDay {
    MorningRush,
    Midday,
    EveningRush,
    Evening,
    LateNight,
}

impl TimeOfDay {
    /// Categorize a local hour in `0..24`.
    pub fn from_hour(hour: u32) -> TimeOfDay {
        match hour {
            5..=8 => TimeOfDay::MorningRush,
            9..=15 => TimeOfDay::Midday,
            16..=18 => TimeOfDay::EveningRush,
            19..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::LateNight,
        }
    }

    /// Congestion multiplier applied to nominal travel times.
    #[inline]
    pub fn travel_multiplier(self) -> f64 {
        match self {
            TimeOfDay::MorningRush | TimeOfDay::EveningRush => 1.3,
            TimeOfDay::Midday => 1.1,
            TimeOfDay::Evening => 1.0,
            TimeOfDay::LateNight => 0.9,
        }
    }
}

// ── DateBucket ────────────────────────────────────────────────────────────────

/// Total number of [`DateBucket`] slots: 288 weekday + 288 weekend.
pub const DATE_BUCKET_COUNT: u32 = 576;

/// A 5-minute local-time slot split by weekday/weekend.
///
/// Keys historical bridge-opening statistics.  `minute` is floored to the
/// 5-minute grid (`0, 5, …, 55`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateBucket {
    pub hour: u32,
    pub minute: u32,
    pub is_weekend: bool,
}

impl DateBucket {
    /// Bucket containing `lt`.  Minute is floored to the 5-minute grid.
    pub fn from_local_time(lt: LocalTime) -> DateBucket {
        DateBucket {
            hour: lt.hour,
            minute: (lt.minute / 5) * 5,
            is_weekend: lt.is_weekend(),
        }
    }

    /// Linear index in `0..576` (weekday block first, then weekend).
    #[inline]
    pub fn index(self) -> u32 {
        let base = if self.is_weekend { 288 } else { 0 };
        base + self.hour * 12 + self.minute / 5
    }

    /// Inverse of [`index`](Self::index).  Returns `None` for out-of-range input.
    pub fn from_index(index: u32) -> Option<DateBucket> {
        if index >= DATE_BUCKET_COUNT {
            return None;
        }
        let is_weekend = index >= 288;
        let slot = index % 288;
        Some(DateBucket {
            hour: slot / 12,
            minute: (slot % 12) * 5,
            is_weekend,
        })
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Injected clock capability.
///
/// All time-of-day categorization and bucket computation in the engine goes
/// through this trait; nothing below it touches the process clock directly.
/// Implementations must be `Send + Sync` — scorers may be shared across
/// worker threads.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;

    /// Civil-time breakdown of `at` in the clock's local zone.
    fn local_time(&self, at: Timestamp) -> LocalTime;
}

/// Integer civil-time breakdown shared by the clock implementations.
///
/// Day 0 of the Unix epoch was a Thursday; with 0 = Monday that is weekday 3.
fn break_down(at: Timestamp, utc_offset_secs: i64) -> LocalTime {
    let local = at.0.floor() as i64 + utc_offset_secs;
    let secs_of_day = local.rem_euclid(86_400);
    let days = (local - secs_of_day) / 86_400;
    LocalTime {
        hour: (secs_of_day / 3_600) as u32,
        minute: ((secs_of_day % 3_600) / 60) as u32,
        second: (secs_of_day % 60) as u32,
        day_of_week: ((days.rem_euclid(7) + 3) % 7) as u32,
    }
}

/// Wall clock with a fixed UTC offset.
///
/// `now()` reads `SystemTime`; civil time is derived by integer arithmetic
/// from the configured offset.  Zone rules (DST transitions) are the host's
/// problem: pass the offset in force for the horizon being scored.
#[derive(Copy, Clone, Debug)]
pub struct FixedOffsetClock {
    pub utc_offset_secs: i64,
}

impl FixedOffsetClock {
    pub fn new(utc_offset_secs: i64) -> Self {
        Self { utc_offset_secs }
    }

    /// Clock fixed at UTC.
    pub fn utc() -> Self {
        Self::new(0)
    }
}

impl Clock for FixedOffsetClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch system clocks collapse to the epoch rather than panic.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Timestamp(secs)
    }

    fn local_time(&self, at: Timestamp) -> LocalTime {
        break_down(at, self.utc_offset_secs)
    }
}

/// Deterministic clock for tests: `now()` returns a fixed instant.
#[derive(Copy, Clone, Debug)]
pub struct FixedClock {
    pub now: Timestamp,
    pub utc_offset_secs: i64,
}

impl FixedClock {
    pub fn new(now: Timestamp, utc_offset_secs: i64) -> Self {
        Self {
            now,
            utc_offset_secs,
        }
    }

    /// Fixed clock at the given UTC instant with no offset.
    pub fn at(now: Timestamp) -> Self {
        Self::new(now, 0)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn local_time(&self, at: Timestamp) -> LocalTime {
        break_down(at, self.utc_offset_secs)
    }
}
