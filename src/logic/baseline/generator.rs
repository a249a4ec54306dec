//! Synthetic Baseline Generator
//!
//! Sinh dữ liệu "bình thường" giả lập để bootstrap model khi chưa có dữ liệu lịch sử.
//! Not a production baseline: models trained on it carry `TrainingSource::Synthetic`.

use ndarray::Array2;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{LogNormal, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::logic::features::layout::{FEATURE_COUNT, IDX_RX, IDX_TX};

// ============================================================================
// COLUMN DISTRIBUTIONS (documented, fixed)
// ============================================================================

/// Distribution of one synthetic feature column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnDistribution {
    Normal { mean: f64, std_dev: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Poisson { lambda: f64 },
    Uniform { low: f64, high: f64 },
}

/// One entry per feature, in layout order
pub const BASELINE_COLUMNS: [ColumnDistribution; FEATURE_COUNT] = [
    ColumnDistribution::Normal { mean: 22.0, std_dev: 3.0 },   // temperature
    ColumnDistribution::Normal { mean: 50.0, std_dev: 10.0 },  // humidity
    ColumnDistribution::LogNormal { mu: 8.0, sigma: 1.5 },     // tx_bytes proxy
    ColumnDistribution::LogNormal { mu: 7.5, sigma: 1.5 },     // rx_bytes proxy
    ColumnDistribution::Poisson { lambda: 5.0 },               // connections
    ColumnDistribution::Uniform { low: 0.0, high: 1.0 },       // hour_normalized
    ColumnDistribution::Uniform { low: 0.0, high: 1.0 },       // weekday_normalized
];

/// Scale of the synthetic traffic columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficScale {
    /// Raw LogNormal samples, as documented in BASELINE_COLUMNS
    #[default]
    Raw,
    /// log1p applied, matching what the extractor produces for real readings
    Log1p,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid distribution parameters for column {column}: {reason}")]
pub struct BaselineError {
    pub column: usize,
    pub reason: String,
}

// ============================================================================
// GENERATOR
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineGenerator {
    pub traffic_scale: TrafficScale,
}

impl BaselineGenerator {
    pub fn new(traffic_scale: TrafficScale) -> Self {
        Self { traffic_scale }
    }

    /// (n_samples, FEATURE_COUNT) matrix of "normal" vectors
    ///
    /// Columns are filled one after another from a single seeded stream, so
    /// the same (n_samples, seed) always reproduces the same bits.
    pub fn generate_normal(&self, n_samples: usize, seed: u64) -> Result<Array2<f64>, BaselineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut matrix = Array2::zeros((n_samples, FEATURE_COUNT));

        for (col, dist) in BASELINE_COLUMNS.iter().enumerate() {
            let column = sample_column(dist, n_samples, &mut rng)
                .map_err(|reason| BaselineError { column: col, reason })?;

            let log_scaled = self.traffic_scale == TrafficScale::Log1p
                && (col == IDX_TX || col == IDX_RX);

            for (row, value) in column.into_iter().enumerate() {
                matrix[[row, col]] = if log_scaled { value.ln_1p() } else { value };
            }
        }

        Ok(matrix)
    }
}

/// Shorthand with the documented (raw) traffic scale
pub fn generate_normal(n_samples: usize, seed: u64) -> Result<Array2<f64>, BaselineError> {
    BaselineGenerator::default().generate_normal(n_samples, seed)
}

fn sample_column(
    dist: &ColumnDistribution,
    n: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<f64>, String> {
    let values: Vec<f64> = match *dist {
        ColumnDistribution::Normal { mean, std_dev } => {
            let d = Normal::new(mean, std_dev).map_err(|e| e.to_string())?;
            d.sample_iter(rng).take(n).collect()
        }
        ColumnDistribution::LogNormal { mu, sigma } => {
            let d = LogNormal::new(mu, sigma).map_err(|e| e.to_string())?;
            d.sample_iter(rng).take(n).collect()
        }
        ColumnDistribution::Poisson { lambda } => {
            let d: Poisson<f64> = Poisson::new(lambda).map_err(|e| e.to_string())?;
            d.sample_iter(rng).take(n).collect()
        }
        ColumnDistribution::Uniform { low, high } => {
            if !(low < high) {
                return Err(format!("empty range [{}, {})", low, high));
            }
            Uniform::new(low, high).sample_iter(rng).take(n).collect()
        }
    };
    Ok(values)
}
