//! Info command implementation

use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use pixelbench_harness::HarnessConfig;
use pixelbench_wasm::exports::REQUIRED_EXPORTS;
use pixelbench_wasm::{IsolatedModule, WasmRuntime};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// TOML configuration file
    #[arg(short, long, env = "PIXELBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compiled filter module (.wasm)
    #[arg(short, long)]
    pub module: Option<PathBuf>,

    /// Also print the effective configuration
    #[arg(long)]
    pub show_config: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;
    if let Some(module) = args.module {
        config.module_path = module;
    }

    let runtime = WasmRuntime::new(config.runtime_limits())?;
    let module = runtime
        .load_file(&config.module_path)
        .with_context(|| format!("Failed to load {}", config.module_path.display()))?;

    output::success(&format!("Loaded {}", config.module_path.display()));
    output::info(&format!("Memory size: {} bytes", module.memory_size()));

    let exported = module.exported_functions();
    println!("\nExports:");
    for name in &exported {
        let marker = if REQUIRED_EXPORTS.contains(&name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("  {} {}", marker, name);
    }

    if args.show_config {
        println!("\nEffective configuration:\n{}", config.to_toml()?);
    }

    Ok(())
}
