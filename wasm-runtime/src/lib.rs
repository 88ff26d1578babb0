//! WASM filter module runtime
//!
//! Loads the filter module with wasmtime and moves pixel buffers in and out
//! of its private linear memory. The bridge talks to the module only through
//! the [`IsolatedModule`] trait, so the marshaling protocol can be exercised
//! against any implementation of the export surface.

pub mod bridge;
pub mod error;
pub mod exports;
pub mod foreign;
pub mod host;
pub mod runtime;

pub use bridge::{BridgeStats, BufferBridge};
pub use error::BridgeError;
pub use foreign::ForeignBuffer;
pub use runtime::{RuntimeLimits, WasmModule, WasmRuntime};

use pixelbench_shared::FilterRequest;

/// The export surface of a filter module, as seen from the host.
///
/// Addresses are offsets into the module's own memory. `alloc` returns 0
/// when it cannot satisfy a request; callers must check before use.
pub trait IsolatedModule {
    /// `alloc(size) -> address`, 0 on failure
    fn alloc(&mut self, size: u32) -> Result<u32, BridgeError>;

    /// `free(address, size)` with the size passed to `alloc`
    fn free(&mut self, address: u32, size: u32) -> Result<(), BridgeError>;

    /// Copy `bytes` into module memory at `address`
    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), BridgeError>;

    /// Copy `out.len()` bytes from module memory at `address`
    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), BridgeError>;

    /// Run the module's implementation of `request` over the buffer at `address`
    fn invoke(
        &mut self,
        request: &FilterRequest,
        address: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BridgeError>;

    /// Current size of the module's linear memory in bytes
    fn memory_size(&self) -> usize;
}
