use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::sampling::sample_rows;
use crate::error::{ExplorerError, Result};
use crate::processors::WorkingSubset;
use crate::utils::constants::{
    CLUSTER_COUNT, CLUSTER_SAMPLE_CAP, KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_TOLERANCE,
    SAMPLE_SEED,
};

/// Feature order used for clustering: primary pollutant plus the three
/// weather drivers
pub const CLUSTER_FEATURES: [&str; 4] = ["PM2.5", "TEMP", "WSPM", "RAIN"];

const FEATURE_COUNT: usize = CLUSTER_FEATURES.len();

/// One sampled row with its cluster label. Feature values are the original
/// (unscaled) measurements; the label carries no ordering semantics.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteredRow {
    pub pm25: f64,
    pub temperature: f64,
    pub wind_speed: f64,
    pub rain: f64,
    pub cluster: usize,
}

/// Result of one clustering invocation. Transient: nothing here is cached
/// or written back into the canonical dataset.
#[derive(Debug, Serialize)]
pub struct ClusteringOutcome {
    rows: Vec<ClusteredRow>,
    sizes: Vec<usize>,
}

impl ClusteringOutcome {
    fn empty() -> Self {
        Self {
            rows: Vec::new(),
            sizes: vec![0; CLUSTER_COUNT],
        }
    }

    pub fn rows(&self) -> &[ClusteredRow] {
        &self.rows
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with strictly positive rainfall, for the rain-restricted view
    pub fn rainy_rows(&self) -> Vec<&ClusteredRow> {
        self.rows.iter().filter(|row| row.rain > 0.0).collect()
    }

    /// Mean of each clustering feature within one cluster, in
    /// `CLUSTER_FEATURES` order
    pub fn feature_means(&self, cluster: usize) -> Option<[f64; FEATURE_COUNT]> {
        let members: Vec<&ClusteredRow> =
            self.rows.iter().filter(|row| row.cluster == cluster).collect();
        if members.is_empty() {
            return None;
        }

        let n = members.len() as f64;
        Some([
            members.iter().map(|r| r.pm25).sum::<f64>() / n,
            members.iter().map(|r| r.temperature).sum::<f64>() / n,
            members.iter().map(|r| r.wind_speed).sum::<f64>() / n,
            members.iter().map(|r| r.rain).sum::<f64>() / n,
        ])
    }
}

/// Partition a deterministic sample of the working subset into three
/// clusters of similar pollution/weather conditions.
///
/// Each invocation redraws its own sample and refits from scratch; with an
/// unchanged subset the fixed seed makes the result identical call to call.
/// Fewer complete feature rows than clusters (including an empty subset)
/// yields an empty outcome rather than an error.
pub fn run_clustering(subset: &WorkingSubset) -> Result<ClusteringOutcome> {
    let sampled = sample_rows(subset.rows(), CLUSTER_SAMPLE_CAP);

    // Rows missing any of the four features are dropped before scaling
    let features: Vec<[f64; FEATURE_COUNT]> = sampled
        .iter()
        .filter_map(|record| {
            match (record.pm25, record.temperature, record.wind_speed, record.rain) {
                (Some(pm25), Some(temperature), Some(wind_speed), Some(rain)) => {
                    Some([pm25, temperature, wind_speed, rain])
                }
                _ => None,
            }
        })
        .collect();

    if features.len() < CLUSTER_COUNT {
        debug!(rows = features.len(), "too few complete rows to cluster");
        return Ok(ClusteringOutcome::empty());
    }

    let scaled = standardize(&features);
    let array = Array2::from_shape_vec((features.len(), FEATURE_COUNT), scaled)
        .map_err(|e| ExplorerError::Clustering(format!("failed to shape feature matrix: {e}")))?;
    let dataset = DatasetBase::from(array);

    let rng = Xoshiro256Plus::seed_from_u64(SAMPLE_SEED);
    let model = KMeans::params_with_rng(CLUSTER_COUNT, rng)
        .n_runs(KMEANS_RESTARTS)
        .max_n_iterations(KMEANS_MAX_ITERATIONS)
        .tolerance(KMEANS_TOLERANCE)
        .fit(&dataset)
        .map_err(|e| ExplorerError::Clustering(format!("k-means failed: {e}")))?;

    let labels = model.predict(&dataset);

    let mut sizes = vec![0usize; CLUSTER_COUNT];
    let rows: Vec<ClusteredRow> = features
        .iter()
        .zip(labels.iter())
        .map(|(feature, &cluster)| {
            sizes[cluster] += 1;
            ClusteredRow {
                pm25: feature[0],
                temperature: feature[1],
                wind_speed: feature[2],
                rain: feature[3],
                cluster,
            }
        })
        .collect();

    info!(rows = rows.len(), "clustering complete");
    Ok(ClusteringOutcome { rows, sizes })
}

/// Zero mean / unit variance per feature, statistics taken from the
/// sampled-and-filtered set only. A zero-variance feature keeps scale 1.
fn standardize(features: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
    let n = features.len() as f64;
    let mut means = [0.0; FEATURE_COUNT];
    let mut scales = [1.0; FEATURE_COUNT];

    for column in 0..FEATURE_COUNT {
        let mean = features.iter().map(|row| row[column]).sum::<f64>() / n;
        let variance = features
            .iter()
            .map(|row| (row[column] - mean).powi(2))
            .sum::<f64>()
            / n;
        means[column] = mean;
        if variance > 0.0 {
            scales[column] = variance.sqrt();
        }
    }

    let mut scaled = Vec::with_capacity(features.len() * FEATURE_COUNT);
    for row in features {
        for column in 0..FEATURE_COUNT {
            scaled.push((row[column] - means[column]) / scales[column]);
        }
    }
    scaled
}
