//! Run command implementation

use super::{load_config, load_source, CommonArgs, ParamArgs};
use crate::output;
use anyhow::Result;
use clap::Args;
use pixelbench_harness::output::write_report;
use pixelbench_harness::Harness;
use pixelbench_shared::{BenchmarkReport, FilterKind, FilterRequest};
use pixelbench_wasm::IsolatedModule;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Filter to benchmark (grayscale, invert, sepia, threshold, brightness, blur, sobel)
    pub filter: FilterKind,

    #[command(flatten)]
    pub params: ParamArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.common, &args.params)?;
    let request = FilterRequest::from_parts(args.filter, &config.params)?;
    let source = load_source(&args.common)?;
    let mut harness = Harness::from_config(&config)?;

    let run = match harness.run(&request, &source) {
        Ok(run) => run,
        Err(e) => {
            output::error(&format!("{} failed: {}", request, e));
            return Err(e.into());
        }
    };

    output::print_result(&run.result);
    if run.result.outputs_match == Some(false) {
        output::warning("Host and bridge outputs differ");
    }

    if let Some(path) = &args.common.json {
        let mut report = BenchmarkReport::new(source.width(), source.height(), config.iterations);
        report.module_memory_bytes = harness.module().memory_size();
        report.results.push(run.result);
        write_report(&report, path)?;
        output::success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
