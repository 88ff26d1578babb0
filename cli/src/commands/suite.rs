//! Suite command implementation

use super::{load_config, load_source, CommonArgs, ParamArgs};
use crate::output;
use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pixelbench_harness::output::write_report;
use pixelbench_harness::Harness;
use pixelbench_shared::FilterKind;

#[derive(Args, Debug)]
pub struct SuiteArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: SuiteArgs) -> Result<()> {
    let config = load_config(&args.common, &args.params)?;
    let source = load_source(&args.common)?;
    let mut harness = Harness::from_config(&config)?;

    let pb = ProgressBar::new(FilterKind::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let outcome = harness.run_suite_with(&source, &config.params, |result| {
        pb.set_message(result.request.to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            output::error(&format!("Suite stopped: {}", e));
            return Err(e.into());
        }
    };

    output::print_table(&report.results);
    println!();

    let mismatches = report.mismatches();
    if mismatches > 0 {
        output::warning(&format!(
            "{} of {} filters produced different outputs",
            mismatches,
            report.results.len()
        ));
    }
    let faster = report.results.iter().filter(|r| r.bridge_faster()).count();
    output::info(&format!(
        "Bridge faster on {} of {} filters, module memory {} bytes",
        faster,
        report.results.len(),
        report.module_memory_bytes
    ));

    if let Some(path) = &args.common.json {
        write_report(&report, path)?;
        output::success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}
