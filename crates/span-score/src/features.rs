//! Prediction feature vectors.
//!
//! Fourteen values per `(bridge, ETA)` pair.  The first four are cyclic
//! encodings of local time (minute-of-day and weekday as sine/cosine
//! pairs, so midnight sits next to 23:59 in feature space).  The rest are
//! live-context signals — recent opening rates, detour geometry, gate
//! anomaly, speeds — drawn from the deterministic per-bridge stream until a
//! telemetry feed supplies real values: the same `(bridge id, 5-minute
//! bucket, seed)` triple always produces the same vector, which is what the
//! feature cache and every determinism guarantee depend on.

use std::f64::consts::TAU;
use std::sync::Arc;

use span_core::{Clock, Lcg64, Timestamp, feature_seed};

/// Length of every feature vector.
pub const FEATURE_LEN: usize = 14;

/// Builds feature vectors from an injected clock and the global seed.
pub struct FeatureBuilder {
    clock: Arc<dyn Clock>,
    random_seed: u64,
}

impl FeatureBuilder {
    pub fn new(clock: Arc<dyn Clock>, random_seed: u64) -> Self {
        Self { clock, random_seed }
    }

    /// The 5-minute bucket of `eta` in the builder's local zone.
    pub fn bucket(&self, eta: Timestamp) -> u32 {
        self.clock.local_time(eta).five_minute_bucket()
    }

    /// Feature vector for `bridge_id` at `eta`:
    ///
    /// | Index | Feature                                          |
    /// |-------|--------------------------------------------------|
    /// | 0–1   | sin/cos of minute-of-day                         |
    /// | 2–3   | sin/cos of day-of-week                           |
    /// | 4–5   | opening rate over the last 5 / 30 minutes, `[0,1]` |
    /// | 6     | detour delta, seconds `[0,900)`                  |
    /// | 7     | crossing rate `[0,1]`                            |
    /// | 8     | detour route available, `{0,1}`                  |
    /// | 9     | detour penalty, seconds `[0,300)`                |
    /// | 10    | gate anomaly score `[0,1]`                       |
    /// | 11    | detour fraction `[0,1]`                          |
    /// | 12    | current approach speed, km/h                     |
    /// | 13    | free-flow approach speed, km/h `[30,60)`         |
    ///
    /// Current speed is the free-flow speed divided by the congestion
    /// multiplier of the ETA's traffic regime.
    pub fn build(&self, bridge_id: &str, eta: Timestamp) -> [f64; FEATURE_LEN] {
        let lt = self.clock.local_time(eta);
        let minute = lt.minute_of_day() as f64;
        let weekday = lt.day_of_week as f64;

        let mut stream = Lcg64::new(feature_seed(
            bridge_id,
            lt.five_minute_bucket(),
            self.random_seed,
        ));

        let open_5m = stream.next_f64();
        let open_30m = stream.next_f64();
        let detour_delta = stream.next_range(0.0, 900.0);
        let cross_rate = stream.next_f64();
        let via_routable = if stream.next_f64() < 0.9 { 1.0 } else { 0.0 };
        let via_penalty = stream.next_range(0.0, 300.0);
        let gate_anom = stream.next_f64();
        let detour_frac = stream.next_f64();
        let normal_speed = stream.next_range(30.0, 60.0);
        let current_speed = normal_speed / lt.time_of_day().travel_multiplier();

        [
            (TAU * minute / 1_440.0).sin(),
            (TAU * minute / 1_440.0).cos(),
            (TAU * weekday / 7.0).sin(),
            (TAU * weekday / 7.0).cos(),
            open_5m,
            open_30m,
            detour_delta,
            cross_rate,
            via_routable,
            via_penalty,
            gate_anom,
            detour_frac,
            current_speed,
            normal_speed,
        ]
    }
}
