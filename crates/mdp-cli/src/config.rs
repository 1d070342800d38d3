//! Configuration loading for the mdp CLI
//!
//! Layers, lowest precedence first: built-in defaults, a TOML file,
//! `MDP__SECTION__KEY` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{ConfigBuilder, Environment, File, FileFormat};
use mdp_core::RewardDensity;
use mdp_rl::SolverConfig;
use serde::{Deserialize, Serialize};

/// Name of the file looked up in the working directory and user config dir
pub const CONFIG_FILE_NAME: &str = "mdp.toml";

/// Resolved CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solver: SolverConfig,
    pub loader: LoaderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Accept models that leave some (state, action) pairs without a reward
    pub sparse_rewards: bool,
}

impl LoaderConfig {
    pub fn density(&self) -> RewardDensity {
        if self.sparse_rewards {
            RewardDensity::Sparse
        } else {
            RewardDensity::Dense
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: bool,
    /// Decimal places in printed tables
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            precision: 4,
        }
    }
}

/// Values given on the command line; `None`/`false` leaves the layer below
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub epsilon: Option<f64>,
    pub max_iterations: Option<usize>,
    pub sparse_rewards: bool,
    pub json: bool,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// An explicit path must exist; otherwise the usual locations are searched.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                bail!("Config file not found: {}", path.display())
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        Self::from_sources(
            path.as_deref(),
            Environment::with_prefix("MDP")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            tracing::debug!("Loading config from: {:?}", path);
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        } else {
            tracing::debug!("No config file found, using defaults");
        }

        builder = builder.add_source(env);

        let config: Self = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config
            .solver
            .validate()
            .context("Invalid [solver] configuration")?;
        Ok(config)
    }

    /// Apply command-line flags on top of the loaded layers
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(epsilon) = overrides.epsilon {
            self.solver.epsilon = epsilon;
        }
        if let Some(max_iterations) = overrides.max_iterations {
            self.solver.max_iterations = max_iterations;
        }
        self.loader.sparse_rewards |= overrides.sparse_rewards;
        self.output.json |= overrides.json;

        self.solver.validate().context("Invalid solver flags")?;
        Ok(())
    }

    /// Render as TOML, the same shape the loader reads
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: MDP_CONFIG env, ./mdp.toml, ~/.config/mdp/mdp.toml
        if let Ok(path) = std::env::var("MDP_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("mdp").join(CONFIG_FILE_NAME);
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}
