//! Pixelbench filter module
//!
//! Built as a WebAssembly module exporting:
//!
//! - `alloc(size) -> ptr` / `free(ptr, size)` for the host to manage buffers
//!   inside this module's linear memory (0 is returned on failure)
//! - `process_<filter>(ptr, width, height[, param])`, rewriting the RGBA
//!   buffer at `ptr` in place
//!
//! The filter math lives in [`filters`] as safe functions over byte slices,
//! so the same code also builds natively for conformance testing. The raw
//! exports are only compiled for `wasm32`, where they cannot collide with
//! the platform allocator symbols.

pub mod filters;

#[cfg(target_arch = "wasm32")]
mod exports;

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// Byte length of a `width x height` RGBA buffer, if it fits in `usize`.
pub fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// Debug line a `trace` build sends to the host after each filter call.
/// Timestamps come from `env.get_timestamp`; a clock that steps backwards
/// reports zero.
pub fn trace_line(filter: &str, start_ns: u64, end_ns: u64) -> String {
    format!("{} took {} ns", filter, end_ns.saturating_sub(start_ns))
}
