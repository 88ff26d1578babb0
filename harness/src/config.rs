//! Harness configuration
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and `PIXELBENCH_*` environment variables. Nested filter
//! parameters use a double underscore, e.g. `PIXELBENCH_PARAMS__BLUR_RADIUS=3`.

use anyhow::{Context, Result};
use pixelbench_shared::FilterParams;
use pixelbench_wasm::RuntimeLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PIXELBENCH";

/// Default location of the compiled guest module
pub const DEFAULT_MODULE_PATH: &str = "target/wasm32-unknown-unknown/release/pixelbench_guest.wasm";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Compiled filter module to load
    pub module_path: PathBuf,

    /// Timed runs per filter; the median is reported
    pub iterations: u32,

    /// Untimed runs before timing starts
    pub warmup: u32,

    /// Compare host and bridge outputs pixel-for-pixel
    pub verify_outputs: bool,

    /// Cap on the module's linear memory, in MiB
    pub max_memory_mb: u32,

    /// Fuel per export call (None = unmetered)
    pub fuel_per_call: Option<u64>,

    /// Parameters for the parameterised filters
    pub params: FilterParams,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(DEFAULT_MODULE_PATH),
            iterations: 1,
            warmup: 0,
            verify_outputs: true,
            max_memory_mb: 256,
            fuel_per_call: None,
            params: FilterParams::default(),
        }
    }
}

impl HarnessConfig {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: HarnessConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            anyhow::bail!("Iterations must be greater than 0");
        }

        if self.max_memory_mb == 0 {
            anyhow::bail!("Module memory cap must be greater than 0 MiB");
        }

        // 4 GiB is the whole 32-bit address space
        if self.max_memory_mb > 4096 {
            anyhow::bail!("Module memory cap too high (max 4096 MiB)");
        }

        if self.fuel_per_call == Some(0) {
            anyhow::bail!("Fuel per call must be greater than 0 when set");
        }

        self.params.validate()?;

        Ok(())
    }

    /// Resource limits for the WASM runtime
    pub fn runtime_limits(&self) -> RuntimeLimits {
        RuntimeLimits {
            max_memory_bytes: self.max_memory_mb as usize * 1024 * 1024,
            fuel_per_call: self.fuel_per_call,
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
