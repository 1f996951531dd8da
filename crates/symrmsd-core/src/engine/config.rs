use crate::core::matching::isomorphism::LabelPolicy;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Which atom-correspondence correction to apply before measuring RMSD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymmetryMode {
    /// Compare atoms in input order.
    Disabled,
    /// Minimize over all graph isomorphisms (exact, potentially exponential).
    #[default]
    Isomorphism,
    /// Per-element linear assignment on geometry alone (approximate, polynomial).
    Assignment,
}

/// Cost of pairing two same-element atoms in assignment-based correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentCost {
    /// Squared distance; the assignment then minimizes the resulting RMSD exactly.
    #[default]
    SquaredEuclidean,
    Euclidean,
}

/// Options of a single pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsdSettings {
    pub center: bool,
    pub minimize: bool,
    pub symmetry: SymmetryMode,
    pub strip_hydrogens: bool,
    pub assignment_cost: AssignmentCost,
}

impl Default for RmsdSettings {
    fn default() -> Self {
        Self {
            center: false,
            minimize: false,
            symmetry: SymmetryMode::Isomorphism,
            strip_hydrogens: true,
            assignment_cost: AssignmentCost::SquaredEuclidean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub rmsd: RmsdSettings,
    pub timeout: Option<Duration>,
    pub num_workers: usize,
    pub label_policy: LabelPolicy,
}

impl BatchConfig {
    /// Loads a configuration from a TOML file; keys missing from the file take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        BatchConfigBuilder::from_toml_file(path)?.build()
    }

    /// Checks the invariants the builder enforces, for configurations assembled by hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_workers",
                reason: "at least one worker is required".to_string(),
            });
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidParameter {
                name: "timeout",
                reason: "timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rmsd: RmsdSettings::default(),
            timeout: None,
            num_workers: default_num_workers(),
            label_policy: LabelPolicy::default(),
        }
    }
}

pub fn default_num_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Default)]
pub struct BatchConfigBuilder {
    center: Option<bool>,
    minimize: Option<bool>,
    symmetry: Option<SymmetryMode>,
    strip_hydrogens: Option<bool>,
    assignment_cost: Option<AssignmentCost>,
    timeout: Option<Duration>,
    num_workers: Option<usize>,
    label_policy: Option<LabelPolicy>,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(mut self, center: bool) -> Self {
        self.center = Some(center);
        self
    }
    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = Some(minimize);
        self
    }
    /// `true` selects isomorphism-based correction, `false` disables correction.
    pub fn symmetry(mut self, enabled: bool) -> Self {
        self.symmetry = Some(if enabled {
            SymmetryMode::Isomorphism
        } else {
            SymmetryMode::Disabled
        });
        self
    }
    pub fn symmetry_mode(mut self, mode: SymmetryMode) -> Self {
        self.symmetry = Some(mode);
        self
    }
    pub fn strip_hydrogens(mut self, strip: bool) -> Self {
        self.strip_hydrogens = Some(strip);
        self
    }
    pub fn assignment_cost(mut self, cost: AssignmentCost) -> Self {
        self.assignment_cost = Some(cost);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = Some(n);
        self
    }
    pub fn label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = Some(policy);
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileBatchConfig = toml::from_str(content)?;
        debug!(?file, "Parsed batch configuration file.");
        file.into_builder()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn build(self) -> Result<BatchConfig, ConfigError> {
        let defaults = RmsdSettings::default();
        let config = BatchConfig {
            rmsd: RmsdSettings {
                center: self.center.unwrap_or(defaults.center),
                minimize: self.minimize.unwrap_or(defaults.minimize),
                symmetry: self.symmetry.unwrap_or(defaults.symmetry),
                strip_hydrogens: self.strip_hydrogens.unwrap_or(defaults.strip_hydrogens),
                assignment_cost: self.assignment_cost.unwrap_or(defaults.assignment_cost),
            },
            timeout: self.timeout,
            num_workers: self.num_workers.unwrap_or_else(default_num_workers),
            label_policy: self.label_policy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileBatchConfig {
    center: Option<bool>,
    minimize: Option<bool>,
    symmetry: Option<SymmetryMode>,
    strip_hydrogens: Option<bool>,
    assignment_cost: Option<AssignmentCost>,
    timeout_seconds: Option<f64>,
    num_workers: Option<usize>,
    allow_unlabeled_graphs: Option<bool>,
}

impl FileBatchConfig {
    fn into_builder(self) -> Result<BatchConfigBuilder, ConfigError> {
        let timeout = self
            .timeout_seconds
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::InvalidParameter {
                    name: "timeout-seconds",
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        let label_policy = self.allow_unlabeled_graphs.map(|allow| {
            if allow {
                LabelPolicy::AllowStructureOnly
            } else {
                LabelPolicy::RequireLabels
            }
        });
        Ok(BatchConfigBuilder {
            center: self.center,
            minimize: self.minimize,
            symmetry: self.symmetry,
            strip_hydrogens: self.strip_hydrogens,
            assignment_cost: self.assignment_cost,
            timeout,
            num_workers: self.num_workers,
            label_policy,
        })
    }
}
