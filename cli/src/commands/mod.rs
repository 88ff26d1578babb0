//! Subcommand implementations

pub mod info;
pub mod run;
pub mod suite;

use crate::image_source;
use anyhow::{Context, Result};
use clap::Args;
use pixelbench_harness::HarnessConfig;
use pixelbench_shared::{FilterParams, PixelBuffer};
use std::path::PathBuf;

/// Options shared by the benchmarking commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Input image (PNG, JPEG or BMP), decoded to RGBA
    #[arg(short, long, conflicts_with = "synthetic")]
    pub image: Option<PathBuf>,

    /// Generate a gradient test image instead, e.g. "640x480"
    #[arg(short, long, default_value = "640x480")]
    pub synthetic: String,

    /// TOML configuration file
    #[arg(short, long, env = "PIXELBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compiled filter module (.wasm)
    #[arg(short, long)]
    pub module: Option<PathBuf>,

    /// Timed runs per filter
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Untimed runs before timing
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Skip the pixel-for-pixel output comparison
    #[arg(long)]
    pub no_verify: bool,

    /// Write the results as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Overrides for the parameterised filters
#[derive(Args, Debug)]
pub struct ParamArgs {
    /// Threshold level (0-255)
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Brightness delta (-255 to 255)
    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<i32>,

    /// Box blur radius in pixels
    #[arg(long)]
    pub blur_radius: Option<u32>,
}

impl ParamArgs {
    fn apply(&self, params: &mut FilterParams) {
        if let Some(threshold) = self.threshold {
            params.threshold = threshold;
        }
        if let Some(brightness) = self.brightness {
            params.brightness = brightness;
        }
        if let Some(radius) = self.blur_radius {
            params.blur_radius = radius;
        }
    }
}

/// Configuration file and environment, then command-line overrides.
pub fn load_config(common: &CommonArgs, params: &ParamArgs) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(common.config.as_deref())?;
    if let Some(module) = &common.module {
        config.module_path = module.clone();
    }
    if let Some(iterations) = common.iterations {
        config.iterations = iterations;
    }
    if let Some(warmup) = common.warmup {
        config.warmup = warmup;
    }
    if common.no_verify {
        config.verify_outputs = false;
    }
    params.apply(&mut config.params);
    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

/// The image named on the command line, or a synthetic one.
pub fn load_source(common: &CommonArgs) -> Result<PixelBuffer> {
    match &common.image {
        Some(path) => image_source::load(path),
        None => {
            let (width, height) = pixelbench_shared::utils::parse_dimensions(&common.synthetic)
                .context("Failed to parse --synthetic size")?;
            image_source::synthetic(width, height)
        }
    }
}
