//! Configuration for a dataset analysis run.
//!
//! Use [`AnalysisConfig::builder()`] for a validated configuration; the
//! defaults reproduce the reference heuristics (100-value samples, seed 42,
//! 0.95 uniqueness threshold, 4 quantile buckets with a 5-bin fallback).

use serde::{Deserialize, Serialize};

/// Default number of values sampled per column for type voting.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Default seed for the sampling RNG.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Configuration for one analysis call.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_insight::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .group_by_column("department")
///     .sample_size(200)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum number of non-missing values sampled for type voting.
    /// Default: 100
    pub sample_size: usize,

    /// Seed for the sampling RNG. Same seed and same column give the same
    /// semantic type.
    /// Default: 42
    pub sample_seed: u64,

    /// Distinct/non-missing ratio above which an untrusted column becomes an id.
    /// Default: 0.95
    pub id_uniqueness_threshold: f64,

    /// Number of quantile buckets for numeric group-by columns.
    /// Default: 4
    pub quantile_buckets: usize,

    /// Number of equal-width bins used when quantile binning fails.
    /// Default: 5
    pub fallback_bins: usize,

    /// Maximum number of example values carried in analyzer records.
    /// Default: 5
    pub example_limit: usize,

    /// Column to aggregate by. Unknown names are ignored.
    /// Default: None
    pub group_by_column: Option<String>,

    /// Whether duplicate profiles carry the full value distribution.
    /// Default: true
    pub include_value_distribution: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_seed: DEFAULT_SAMPLE_SEED,
            id_uniqueness_threshold: 0.95,
            quantile_buckets: 4,
            fallback_bins: 5,
            example_limit: 5,
            group_by_column: None,
            include_value_distribution: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.id_uniqueness_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "id_uniqueness_threshold".to_string(),
                value: self.id_uniqueness_threshold,
            });
        }

        if self.sample_size == 0 {
            return Err(ConfigValidationError::ZeroCount("sample_size".to_string()));
        }

        if self.quantile_buckets == 0 {
            return Err(ConfigValidationError::ZeroCount(
                "quantile_buckets".to_string(),
            ));
        }

        if self.fallback_bins == 0 {
            return Err(ConfigValidationError::ZeroCount("fallback_bins".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("'{0}' must be at least 1")]
    ZeroCount(String),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    sample_size: Option<usize>,
    sample_seed: Option<u64>,
    id_uniqueness_threshold: Option<f64>,
    quantile_buckets: Option<usize>,
    fallback_bins: Option<usize>,
    example_limit: Option<usize>,
    group_by_column: Option<String>,
    include_value_distribution: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Set the maximum sample size for type voting.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Set the sampling seed.
    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Set the uniqueness ratio above which a column is treated as an id.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.95 = 95%)
    pub fn id_uniqueness_threshold(mut self, threshold: f64) -> Self {
        self.id_uniqueness_threshold = Some(threshold);
        self
    }

    /// Set the number of quantile buckets for numeric grouping.
    pub fn quantile_buckets(mut self, buckets: usize) -> Self {
        self.quantile_buckets = Some(buckets);
        self
    }

    /// Set the number of equal-width fallback bins.
    pub fn fallback_bins(mut self, bins: usize) -> Self {
        self.fallback_bins = Some(bins);
        self
    }

    /// Set how many example values analyzer records keep.
    pub fn example_limit(mut self, limit: usize) -> Self {
        self.example_limit = Some(limit);
        self
    }

    /// Set the column used for group aggregation.
    pub fn group_by_column(mut self, column: impl Into<String>) -> Self {
        self.group_by_column = Some(column.into());
        self
    }

    /// Enable or disable full value distributions in duplicate profiles.
    pub fn include_value_distribution(mut self, include: bool) -> Self {
        self.include_value_distribution = Some(include);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            sample_size: self.sample_size.unwrap_or(defaults.sample_size),
            sample_seed: self.sample_seed.unwrap_or(defaults.sample_seed),
            id_uniqueness_threshold: self
                .id_uniqueness_threshold
                .unwrap_or(defaults.id_uniqueness_threshold),
            quantile_buckets: self.quantile_buckets.unwrap_or(defaults.quantile_buckets),
            fallback_bins: self.fallback_bins.unwrap_or(defaults.fallback_bins),
            example_limit: self.example_limit.unwrap_or(defaults.example_limit),
            group_by_column: self.group_by_column,
            include_value_distribution: self
                .include_value_distribution
                .unwrap_or(defaults.include_value_distribution),
        };

        config.validate()?;
        Ok(config)
    }
}
