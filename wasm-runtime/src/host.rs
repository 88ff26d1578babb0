//! Host functions available to the filter module

use crate::runtime::ModuleState;
use wasmtime::{Caller, Error, Linker};

/// Register host functions with the WASM linker.
///
/// Modules are not required to import any of these; unused definitions are
/// ignored at instantiation.
pub fn register_host_functions(linker: &mut Linker<ModuleState>) -> Result<(), Error> {
    // Debug output from modules built with the `trace` feature
    linker.func_wrap(
        "env",
        "log",
        |mut caller: Caller<'_, ModuleState>, ptr: u32, len: u32| {
            if let Some(memory) = caller.get_export("memory").and_then(|e| e.into_memory()) {
                let mut buf = vec![0u8; len as usize];
                if memory.read(&caller, ptr as usize, &mut buf).is_ok() {
                    if let Ok(msg) = String::from_utf8(buf) {
                        tracing::debug!("[filter module] {}", msg);
                    }
                }
            }
        },
    )?;

    // Wall-clock nanoseconds since the UNIX epoch
    linker.func_wrap("env", "get_timestamp", || -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })?;

    Ok(())
}
