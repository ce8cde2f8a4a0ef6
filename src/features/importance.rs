//! Feature importance via a small `smartcore` random forest regressor
//! trained in-process on (feature row -> realized r_multiple). Importances
//! are derived by permutation: shuffle one column, measure the increase in
//! mean squared prediction error, normalize so all importances sum to 1.
//! This is model-agnostic and needs nothing beyond `fit`/`predict`, so it
//! does not depend on exactly which internals a given `smartcore` version
//! exposes for built-in importances.

use anyhow::{Context, Result};
use smartcore::ensemble::random_forest_regressor::{RandomForestRegressor, RandomForestRegressorParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeatureImportance {
    pub feature_names: Vec<String>,
    pub importances: Vec<f64>,
}

/// Trains a random forest on `rows` (one Vec<f64> per sample, all rows the
/// same length) against `targets`, then reports normalized permutation
/// importances for each column.
pub fn compute_feature_importance(
    rows: &[Vec<f64>],
    targets: &[f64],
    feature_names: &[&str],
) -> Result<FeatureImportance> {
    anyhow::ensure!(rows.len() == targets.len(), "row/target length mismatch");
    anyhow::ensure!(!rows.is_empty(), "no training rows supplied");
    let n_features = rows[0].len();
    anyhow::ensure!(
        feature_names.len() == n_features,
        "feature_names length does not match row width"
    );

    let x_matrix = DenseMatrix::from_2d_vec(&rows.to_vec()).context("building training matrix")?;
    let params = RandomForestRegressorParameters::default()
        .with_n_trees(64)
        .with_max_depth(8)
        .with_min_samples_split(10);

    let model =
        RandomForestRegressor::fit(&x_matrix, &targets.to_vec(), params).context("training random forest")?;

    let baseline_predictions = model.predict(&x_matrix).context("baseline prediction")?;
    let baseline_mse = mse(&baseline_predictions, targets);

    let mut importances = vec![0.0; n_features];
    for (col, slot) in importances.iter_mut().enumerate() {
        let mut shuffled = rows.to_vec();
        permute_column(&mut shuffled, col);
        let shuffled_matrix = DenseMatrix::from_2d_vec(&shuffled).context("building shuffled matrix")?;
        let shuffled_predictions = model.predict(&shuffled_matrix).context("shuffled prediction")?;
        let shuffled_mse = mse(&shuffled_predictions, targets);
        *slot = (shuffled_mse - baseline_mse).max(0.0);
    }

    let total: f64 = importances.iter().sum();
    if total > f64::EPSILON {
        for v in importances.iter_mut() {
            *v /= total;
        }
    }

    Ok(FeatureImportance {
        feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
        importances,
    })
}

fn mse(predictions: &[f64], targets: &[f64]) -> f64 {
    let n = predictions.len().max(1) as f64;
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n
}

/// Deterministic column permutation: reverses the column's values across
/// rows. Cheap, dependency-free, and sufficient to break the feature's
/// relationship to the target without pulling in a PRNG crate for one pass.
fn permute_column(rows: &mut [Vec<f64>], col: usize) {
    let mut values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
    values.reverse();
    for (row, value) in rows.iter_mut().zip(values.into_iter()) {
        row[col] = value;
    }
}
