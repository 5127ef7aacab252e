//! `span-predict` — the predictor seam.
//!
//! The scoring pipeline consumes bridge-opening predictions through the
//! [`BridgePredictor`] trait; concrete predictors (historical baselines, ML
//! models, remote services) live in the embedding application.  This crate
//! owns the contract: input/result shapes, input validation, the batch ⇄
//! single default bridging, and the historical-data provider interface the
//! baseline predictors are built on.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`predictor`] | `BridgePredictor`, `PredictionInput`, result types, validation helpers |
//! | [`history`]   | `HistoryProvider`, `BucketStats`, Beta smoothing        |
//! | [`error`]     | `PredictError`, `PredictResult<T>`                      |

pub mod error;
pub mod history;
pub mod predictor;


pub use error::{PredictError, PredictResult};
pub use history::{BucketStats, HistoryProvider, MemoryHistory};
pub use predictor::{
    BatchPredictionResult, BridgePredictor, PredictionInput, PredictionResult, validate_batch,
    validate_input,
};
