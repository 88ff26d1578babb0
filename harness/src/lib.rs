//! Pixelbench benchmark harness
//!
//! Runs the same filter request on the host filter library and through the
//! WASM buffer bridge, times both paths, and checks that they agree.

pub mod config;
pub mod output;

pub use config::HarnessConfig;

use anyhow::Context;
use pixelbench_shared::utils::time::{format_duration, median};
use pixelbench_shared::{
    BenchmarkReport, BenchmarkResult, FilterKind, FilterParams, FilterRequest, PixelBuffer,
};
use pixelbench_wasm::{BridgeError, BridgeStats, BufferBridge, IsolatedModule, WasmModule, WasmRuntime};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where the harness is in handling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessPhase {
    Idle,
    RunningHost,
    RunningBridge,
    Reporting,
}

impl fmt::Display for HarnessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessPhase::Idle => "idle",
            HarnessPhase::RunningHost => "running host",
            HarnessPhase::RunningBridge => "running bridge",
            HarnessPhase::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// How each request is repeated and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Timed runs per path (at least 1)
    pub iterations: u32,
    /// Untimed runs per path before timing
    pub warmup: u32,
    pub verify_outputs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            warmup: 0,
            verify_outputs: true,
        }
    }
}

impl From<&HarnessConfig> for RunOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            iterations: config.iterations,
            warmup: config.warmup,
            verify_outputs: config.verify_outputs,
        }
    }
}

/// One completed request: the timing record and both filtered images.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub result: BenchmarkResult,
    pub host_output: PixelBuffer,
    pub bridge_output: PixelBuffer,
}

/// Benchmark harness over any [`IsolatedModule`].
pub struct Harness<M: IsolatedModule> {
    bridge: BufferBridge<M>,
    options: RunOptions,
    phase: HarnessPhase,
}

impl Harness<WasmModule> {
    /// Load the module named by `config` with its resource limits.
    pub fn from_config(config: &HarnessConfig) -> anyhow::Result<Self> {
        let runtime = WasmRuntime::new(config.runtime_limits())?;
        let module = runtime
            .load_file(&config.module_path)
            .with_context(|| format!("Failed to load {}", config.module_path.display()))?;
        info!("Loaded filter module from {}", config.module_path.display());
        Ok(Self::new(module, RunOptions::from(config)))
    }
}

impl<M: IsolatedModule> Harness<M> {
    pub fn new(module: M, options: RunOptions) -> Self {
        Self {
            bridge: BufferBridge::new(module),
            options: RunOptions {
                iterations: options.iterations.max(1),
                ..options
            },
            phase: HarnessPhase::Idle,
        }
    }

    pub fn phase(&self) -> HarnessPhase {
        self.phase
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn module(&self) -> &M {
        self.bridge.module()
    }

    pub fn bridge_stats(&self) -> &BridgeStats {
        self.bridge.stats()
    }

    /// Benchmark one request against `source`.
    ///
    /// Requests with out-of-range parameters are rejected before either
    /// path runs. A bridge failure ends the request; the harness is back in
    /// [`HarnessPhase::Idle`] either way and accepts the next one.
    pub fn run(
        &mut self,
        request: &FilterRequest,
        source: &PixelBuffer,
    ) -> Result<BenchmarkRun, BridgeError> {
        request.validate()?;
        info!(
            "Running {} on {}x{} image",
            request,
            source.width(),
            source.height()
        );
        let outcome = self.run_phases(request, source);
        self.phase = HarnessPhase::Idle;
        if let Err(e) = &outcome {
            warn!("{} failed: {}", request, e);
        }
        outcome
    }

    fn run_phases(
        &mut self,
        request: &FilterRequest,
        source: &PixelBuffer,
    ) -> Result<BenchmarkRun, BridgeError> {
        self.phase = HarnessPhase::RunningHost;
        let (host_time, host_output) = self.time_host(request, source);
        info!("Host execution time: {}", format_duration(host_time));

        self.phase = HarnessPhase::RunningBridge;
        let (bridge_time, bridge_output) = self.time_bridge(request, source)?;
        info!(
            "Bridge execution time: {} (incl. allocation & copy)",
            format_duration(bridge_time)
        );

        self.phase = HarnessPhase::Reporting;
        let outputs_match = self.options.verify_outputs.then(|| {
            match host_output.first_difference(&bridge_output) {
                None => true,
                Some((x, y)) => {
                    warn!(
                        "{} outputs diverge at ({}, {}): host {:?}, bridge {:?}",
                        request,
                        x,
                        y,
                        host_output.pixel(x, y),
                        bridge_output.pixel(x, y)
                    );
                    false
                }
            }
        });

        let result = BenchmarkResult::new(
            *request,
            source.width(),
            source.height(),
            host_time,
            bridge_time,
            outputs_match,
        );
        debug!("{} speedup: {:.2}x", request, result.speedup);

        Ok(BenchmarkRun {
            result,
            host_output,
            bridge_output,
        })
    }

    /// Median time of `apply_in_place` on a private copy. Restoring the copy
    /// between runs is not timed.
    fn time_host(&self, request: &FilterRequest, source: &PixelBuffer) -> (Duration, PixelBuffer) {
        let mut output = source.clone();
        for _ in 0..self.options.warmup {
            output.as_bytes_mut().copy_from_slice(source.as_bytes());
            pixelbench_filters::apply_in_place(request, &mut output);
        }

        let mut samples = Vec::with_capacity(self.options.iterations as usize);
        for _ in 0..self.options.iterations {
            output.as_bytes_mut().copy_from_slice(source.as_bytes());
            let start = Instant::now();
            pixelbench_filters::apply_in_place(request, &mut output);
            samples.push(start.elapsed());
        }
        (median(&samples), output)
    }

    /// Median time of a full bridge call, allocation to deallocation.
    fn time_bridge(
        &mut self,
        request: &FilterRequest,
        source: &PixelBuffer,
    ) -> Result<(Duration, PixelBuffer), BridgeError> {
        for _ in 0..self.options.warmup {
            self.bridge.apply(request, source)?;
        }

        let start = Instant::now();
        let mut output = self.bridge.apply(request, source)?;
        let mut samples = vec![start.elapsed()];
        for _ in 1..self.options.iterations {
            let start = Instant::now();
            output = self.bridge.apply(request, source)?;
            samples.push(start.elapsed());
        }
        Ok((median(&samples), output))
    }

    /// Run every filter kind over `source`.
    pub fn run_suite(
        &mut self,
        source: &PixelBuffer,
        params: &FilterParams,
    ) -> Result<BenchmarkReport, BridgeError> {
        self.run_suite_with(source, params, |_| {})
    }

    /// [`Harness::run_suite`], calling `on_result` after each filter.
    pub fn run_suite_with<F>(
        &mut self,
        source: &PixelBuffer,
        params: &FilterParams,
        mut on_result: F,
    ) -> Result<BenchmarkReport, BridgeError>
    where
        F: FnMut(&BenchmarkResult),
    {
        let mut report =
            BenchmarkReport::new(source.width(), source.height(), self.options.iterations);
        for kind in FilterKind::ALL {
            let request = FilterRequest::from_parts(kind, params)?;
            let run = self.run(&request, source)?;
            on_result(&run.result);
            report.results.push(run.result);
        }
        report.module_memory_bytes = self.bridge.module().memory_size();

        let mismatches = report.mismatches();
        if mismatches > 0 {
            warn!("{} of {} filters produced different outputs", mismatches, report.results.len());
        }
        Ok(report)
    }
}
