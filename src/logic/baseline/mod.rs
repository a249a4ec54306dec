//! Baseline Module - Synthetic "normal" corpus
//!
//! Bootstraps the anomaly model before any real historical corpus exists.
//!
//! # Architecture
//! - `generator.rs`: `BaselineGenerator`, documented column distributions

pub mod generator;

pub use generator::{
    generate_normal, BaselineError, BaselineGenerator, ColumnDistribution, TrafficScale,
    BASELINE_COLUMNS,
};
