//! `span-core` — foundational types for the `drawspan` routing engine.
//!
//! This crate is a dependency of every other `span-*` crate.  It intentionally
//! has no `span-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `NodeId` — opaque, totally ordered node identifier         |
//! | [`time`]    | `Timestamp`, `LocalTime`, `Clock`, `TimeOfDay`, `DateBucket` |
//! | [`seed`]    | FNV-1a seed mixing and the `Lcg64` feature stream          |
//! | [`policy`]  | `BridgePolicy` — bridge-ID acceptance hook                 |
//! | [`config`]  | `EngineConfig` and its section structs                     |
//! | [`error`]   | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.         |

pub mod config;
pub mod error;
pub mod ids;
pub mod policy;
pub mod seed;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    EngineConfig, LogVerbosity, PerformanceConfig, PredictionConfig, ScoringConfig,
};
pub use error::{CoreError, CoreResult};
pub use ids::NodeId;
pub use policy::{BridgePolicy, StaticBridgePolicy};
pub use seed::{Lcg64, feature_seed, fnv1a_64};
pub use time::{Clock, DateBucket, FixedClock, FixedOffsetClock, LocalTime, TimeOfDay, Timestamp};
