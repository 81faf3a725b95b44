pub mod classify;
pub mod error;
pub mod headline;
pub mod kernel;
pub mod predictor;
pub mod stats;
pub mod summary;
