//! Frozen min-max scaler applied to the numeric feature columns.
//!
//! The scaler is exported from the training environment as JSON using the
//! fitted attribute names (`data_min_`, `data_max_`, `feature_range`, ...).
//! It is only ever applied here, never fit. Arithmetic stays in `f64` and
//! follows the `x * scale_ + min_` form so outputs match the training-time
//! transform exactly.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{ChurnError, Result};
use crate::features::schema::NUMERIC_FEATURES;
use crate::features::{EncodedFeatures, ScaledFeatures};

/// On-disk form of a fitted min-max scaler.
#[derive(Debug, Deserialize)]
struct MinMaxScalerArtifact {
    #[serde(default, alias = "feature_names")]
    feature_names_in_: Option<Vec<String>>,
    #[serde(alias = "data_min")]
    data_min_: Vec<f64>,
    #[serde(alias = "data_max")]
    data_max_: Vec<f64>,
    #[serde(default)]
    feature_range: Option<(f64, f64)>,
    #[serde(default)]
    clip: bool,
}

/// Per-column min-max scaler with parameters learned on historical data.
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
    feature_names: Vec<String>,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    feature_range: (f64, f64),
    scale: Vec<f64>,
    min: Vec<f64>,
    clip: bool,
}

impl MinMaxScaler {
    /// Ranges narrower than this are treated as 1 to avoid dividing by ~0.
    const MIN_RANGE: f64 = 10.0 * f64::EPSILON;

    /// Build a scaler from fitted per-column minima and maxima.
    pub fn from_ranges(
        feature_names: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        feature_range: (f64, f64),
        clip: bool,
    ) -> Result<Self> {
        let n = feature_names.len();
        if data_min.len() != n || data_max.len() != n {
            return Err(ChurnError::config(format!(
                "scaler has {} feature names but {} minima and {} maxima",
                n,
                data_min.len(),
                data_max.len()
            )));
        }
        let (range_lo, range_hi) = feature_range;
        if !(range_lo.is_finite() && range_hi.is_finite()) || range_lo >= range_hi {
            return Err(ChurnError::config(format!(
                "invalid scaler feature_range ({}, {})",
                range_lo, range_hi
            )));
        }

        let mut scale = Vec::with_capacity(n);
        let mut min = Vec::with_capacity(n);
        for (i, name) in feature_names.iter().enumerate() {
            let (lo, hi) = (data_min[i], data_max[i]);
            if !(lo.is_finite() && hi.is_finite()) || hi < lo {
                return Err(ChurnError::config(format!(
                    "invalid fitted range for '{}': [{}, {}]",
                    name, lo, hi
                )));
            }
            let mut data_range = hi - lo;
            if data_range < Self::MIN_RANGE {
                data_range = 1.0;
            }
            let s = (range_hi - range_lo) / data_range;
            scale.push(s);
            min.push(range_lo - lo * s);
        }

        Ok(Self {
            feature_names,
            data_min,
            data_max,
            feature_range,
            scale,
            min,
            clip,
        })
    }

    /// Parse a scaler exported as JSON.
    ///
    /// Without `feature_names_in_` the columns are assumed to be the numeric
    /// features in their canonical order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let artifact: MinMaxScalerArtifact = serde_json::from_str(json)
            .map_err(|e| ChurnError::config(format!("invalid scaler JSON: {}", e)))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: MinMaxScalerArtifact) -> Result<Self> {
        let feature_names = artifact.feature_names_in_.unwrap_or_else(|| {
            NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect()
        });
        Self::from_ranges(
            feature_names,
            artifact.data_min_,
            artifact.data_max_,
            artifact.feature_range.unwrap_or((0.0, 1.0)),
            artifact.clip,
        )
    }

    /// Load a scaler artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ChurnError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: MinMaxScalerArtifact =
            serde_json::from_str(&content).map_err(|source| ChurnError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let scaler = Self::from_artifact(artifact)?;
        info!(
            "Loaded min-max scaler from {} ({} columns)",
            path.display(),
            scaler.feature_names.len()
        );
        Ok(scaler)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }

    /// Scale one row whose values are in `feature_names()` order.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.feature_names.len() {
            return Err(ChurnError::config(format!(
                "scaler expects {} columns, got {}",
                self.feature_names.len(),
                row.len()
            )));
        }
        let (lo, hi) = self.feature_range;
        Ok(row
            .iter()
            .zip(self.scale.iter().zip(self.min.iter()))
            .map(|(&x, (&s, &m))| {
                let v = x * s + m;
                if self.clip {
                    v.clamp(lo, hi)
                } else {
                    v
                }
            })
            .collect())
    }
}

/// Apply the frozen scaler to the numeric columns of `encoded`.
///
/// Indicator columns are copied through untouched. Fails with a
/// configuration error unless the scaler's columns are exactly the six
/// numeric features.
pub fn scale(encoded: &EncodedFeatures, scaler: &MinMaxScaler) -> Result<ScaledFeatures> {
    let expected: BTreeSet<&str> = NUMERIC_FEATURES.iter().copied().collect();
    let provided: BTreeSet<&str> = scaler.feature_names().iter().map(String::as_str).collect();
    if expected != provided || provided.len() != scaler.feature_names().len() {
        return Err(ChurnError::config(format!(
            "scaler columns {:?} do not match the numeric features {:?}",
            scaler.feature_names(),
            NUMERIC_FEATURES
        )));
    }

    let row = scaler
        .feature_names()
        .iter()
        .map(|name| {
            encoded.get(name).ok_or_else(|| {
                ChurnError::config(format!("encoded features lack scaler column '{}'", name))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    let scaled_row = scaler.transform(&row)?;

    let mut values = encoded.as_map().clone();
    for (name, value) in scaler.feature_names().iter().zip(scaled_row) {
        values.insert(name.clone(), value);
    }
    debug!("scaled {} numeric columns", scaler.feature_names().len());
    Ok(ScaledFeatures::from_map(values))
}
