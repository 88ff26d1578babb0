//! Buffer bridge: runs one filter inside the module's memory.
//!
//! Per call: allocate a region of `W*H*4` bytes, copy the source in, invoke
//! the filter export, copy the result out into a fresh buffer, free the
//! region. The region is freed on every path that got past allocation.

use crate::error::BridgeError;
use crate::foreign::ForeignBuffer;
use crate::IsolatedModule;
use pixelbench_shared::{FilterRequest, PixelBuffer};
use tracing::{debug, warn};

/// Running bookkeeping for a bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Calls to [`BufferBridge::apply`]
    pub invocations: u64,
    /// Successful `alloc` calls
    pub allocations: u64,
    /// `free` calls, one per successful `alloc`
    pub deallocations: u64,
    pub bytes_copied_in: u64,
    pub bytes_copied_out: u64,
}

impl BridgeStats {
    /// Regions allocated but not yet freed. Zero between calls.
    pub fn outstanding(&self) -> u64 {
        self.allocations - self.deallocations
    }
}

/// Marshals pixel buffers through an [`IsolatedModule`].
pub struct BufferBridge<M: IsolatedModule> {
    module: M,
    stats: BridgeStats,
}

impl<M: IsolatedModule> BufferBridge<M> {
    pub fn new(module: M) -> Self {
        Self {
            module,
            stats: BridgeStats::default(),
        }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn into_inner(self) -> M {
        self.module
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Run `request` over `source` inside the module, returning a new buffer.
    ///
    /// Synchronous: allocation through deallocation completes before return.
    pub fn apply(
        &mut self,
        request: &FilterRequest,
        source: &PixelBuffer,
    ) -> Result<PixelBuffer, BridgeError> {
        let (width, height) = (source.width(), source.height());
        let expected = PixelBuffer::required_len(width, height)?;
        if expected != source.byte_len() {
            return Err(BridgeError::SizeMismatch {
                expected: expected as u32,
                actual: source.byte_len(),
            });
        }
        let size = expected as u32;
        self.stats.invocations += 1;

        let mut region = ForeignBuffer::allocate(&mut self.module, size)?;
        self.stats.allocations += 1;
        debug!(
            "Allocated {} bytes at {:#x} for {}",
            size,
            region.address(),
            request
        );

        let outcome = marshal(&mut region, request, source, &mut self.stats);

        let released = region.release();
        self.stats.deallocations += 1;

        let bytes = match (outcome, released) {
            (Ok(bytes), Ok(())) => bytes,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(free_err)) => {
                warn!("free after failed {} also failed: {}", request, free_err);
                return Err(e);
            }
        };

        Ok(PixelBuffer::new(width, height, bytes)?)
    }
}

/// Steps 2-4 of the bridge protocol against a live region.
fn marshal<M: IsolatedModule + ?Sized>(
    region: &mut ForeignBuffer<'_, M>,
    request: &FilterRequest,
    source: &PixelBuffer,
    stats: &mut BridgeStats,
) -> Result<Vec<u8>, BridgeError> {
    region.copy_in(source.as_bytes())?;
    stats.bytes_copied_in += source.byte_len() as u64;

    region.invoke(request, source.width(), source.height())?;

    let out = region.copy_out(region.len())?;
    stats.bytes_copied_out += out.len() as u64;
    Ok(out)
}
