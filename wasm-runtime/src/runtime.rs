//! WASM runtime implementation for pixel filter modules.
//!
//! Compiles a module exporting `alloc`, `free`, `memory` and the seven
//! `process_*` filters, and exposes it to the bridge as an
//! [`IsolatedModule`]. Each module instance gets its own store, so its
//! linear memory is private to it.

use crate::error::BridgeError;
use crate::exports::{FilterExports, MEMORY_EXPORT};
use crate::host::register_host_functions;
use crate::IsolatedModule;
use anyhow::{Context, Result};
use pixelbench_shared::FilterRequest;
use std::path::Path;
use tracing::{debug, info};
use wasmtime::*;

/// Default cap on a module's linear memory: 256 MiB
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 256 * 1024 * 1024;

/// Resource limits applied to every loaded module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLimits {
    /// Largest linear memory the module may grow to. Growth beyond this
    /// fails inside the module, which makes its `alloc` return 0.
    pub max_memory_bytes: usize,

    /// Fuel granted before each export call (None = unmetered)
    pub fuel_per_call: Option<u64>,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            fuel_per_call: None,
        }
    }
}

/// Per-store host state
pub struct ModuleState {
    limits: StoreLimits,
}

/// WASM runtime for loading filter modules.
pub struct WasmRuntime {
    engine: Engine,
    limits: RuntimeLimits,
}

impl WasmRuntime {
    /// Create a new WASM runtime.
    pub fn new(limits: RuntimeLimits) -> Result<Self, BridgeError> {
        let mut config = Config::new();
        config.consume_fuel(limits.fuel_per_call.is_some());
        config.wasm_bulk_memory(true);
        config.wasm_threads(false);

        let engine = Engine::new(&config)
            .context("Failed to create WASM engine")
            .map_err(BridgeError::ModuleUnavailable)?;
        Ok(Self { engine, limits })
    }

    pub fn limits(&self) -> &RuntimeLimits {
        &self.limits
    }

    /// Read, compile and instantiate a filter module from disk.
    pub fn load_file(&self, path: &Path) -> Result<WasmModule, BridgeError> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Could not read filter module {}", path.display()))
            .map_err(BridgeError::ModuleUnavailable)?;
        self.load(&bytes)
    }

    /// Compile and instantiate a filter module (binary or text format).
    pub fn load(&self, wasm_bytes: &[u8]) -> Result<WasmModule, BridgeError> {
        self.instantiate(wasm_bytes)
            .map_err(BridgeError::ModuleUnavailable)
    }

    fn instantiate(&self, wasm_bytes: &[u8]) -> Result<WasmModule> {
        let module =
            Module::new(&self.engine, wasm_bytes).context("Failed to compile WASM module")?;

        let limits = StoreLimitsBuilder::new()
            .memory_size(self.limits.max_memory_bytes)
            .build();
        let mut store = Store::new(&self.engine, ModuleState { limits });
        store.limiter(|state| &mut state.limits);
        if let Some(fuel) = self.limits.fuel_per_call {
            store.set_fuel(fuel)?;
        }

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;

        // Modules linked with an imported memory get one of the declared type
        let mut imported_memory = None;
        for import in module.imports() {
            if let ExternType::Memory(ty) = import.ty() {
                let memory = Memory::new(&mut store, ty)
                    .context("Failed to create imported memory")?;
                linker.define(&store, import.module(), import.name(), memory)?;
                imported_memory = Some(memory);
            }
        }

        let instance = linker
            .instantiate(&mut store, &module)
            .context("Failed to instantiate WASM module")?;

        // Prefer the module's own memory, fall back to the imported one
        let memory = instance
            .get_memory(&mut store, MEMORY_EXPORT)
            .or(imported_memory)
            .context("WASM module must export `memory`")?;

        let exports = FilterExports::resolve(&instance, &mut store)?;

        let loaded = WasmModule {
            store,
            module,
            memory,
            exports,
            fuel_per_call: self.limits.fuel_per_call,
        };

        info!("Filter module initialized");
        info!("Memory size: {} bytes", loaded.memory_size());
        Ok(loaded)
    }
}

/// An instantiated filter module with its private store and memory.
pub struct WasmModule {
    store: Store<ModuleState>,
    module: Module,
    memory: Memory,
    exports: FilterExports,
    fuel_per_call: Option<u64>,
}

impl WasmModule {
    /// Names of every function the module exports
    pub fn exported_functions(&self) -> Vec<String> {
        self.module
            .exports()
            .filter(|e| matches!(e.ty(), ExternType::Func(_)))
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Reset fuel before an export call
    fn refuel(&mut self) -> Result<()> {
        if let Some(fuel) = self.fuel_per_call {
            self.store.set_fuel(fuel)?;
        }
        Ok(())
    }

    fn call_error(export: &'static str) -> impl FnOnce(anyhow::Error) -> BridgeError {
        move |source| BridgeError::Invoke { export, source }
    }
}

impl IsolatedModule for WasmModule {
    fn alloc(&mut self, size: u32) -> Result<u32, BridgeError> {
        self.refuel().map_err(Self::call_error("alloc"))?;
        let address = self
            .exports
            .alloc
            .call(&mut self.store, size)
            .map_err(Self::call_error("alloc"))?;
        debug!("alloc({}) -> {:#x}", size, address);
        Ok(address)
    }

    fn free(&mut self, address: u32, size: u32) -> Result<(), BridgeError> {
        self.refuel().map_err(Self::call_error("free"))?;
        self.exports
            .free
            .call(&mut self.store, (address, size))
            .map_err(Self::call_error("free"))?;
        debug!("free({:#x}, {})", address, size);
        Ok(())
    }

    // The memory handle is resolved against the store on every access, so
    // growth triggered by `alloc` never leaves a stale view behind.
    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), BridgeError> {
        self.memory
            .write(&mut self.store, address as usize, bytes)
            .map_err(|_| BridgeError::MemoryAccess {
                address,
                len: bytes.len(),
            })
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), BridgeError> {
        let len = out.len();
        self.memory
            .read(&self.store, address as usize, out)
            .map_err(|_| BridgeError::MemoryAccess { address, len })
    }

    fn invoke(
        &mut self,
        request: &FilterRequest,
        address: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BridgeError> {
        let export = request.kind().export_name();
        self.refuel().map_err(Self::call_error(export))?;
        self.exports
            .call(&mut self.store, request, address, width, height)
            .map_err(Self::call_error(export))
    }

    fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }
}
