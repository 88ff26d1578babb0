//! Scoped ownership of a region inside the filter module's memory.
//!
//! A [`ForeignBuffer`] is created by a successful `alloc` and frees the region
//! exactly once, either through [`ForeignBuffer::release`] or, if that is
//! never reached, when it is dropped. It holds the module mutably for its
//! whole life, so a second region cannot be opened while one is live.

use crate::error::BridgeError;
use crate::IsolatedModule;
use pixelbench_shared::FilterRequest;
use tracing::warn;

/// A live allocation of `len` bytes at `address` in module memory.
pub struct ForeignBuffer<'m, M: IsolatedModule + ?Sized> {
    module: &'m mut M,
    address: u32,
    len: u32,
    released: bool,
}

impl<'m, M: IsolatedModule + ?Sized> ForeignBuffer<'m, M> {
    /// Allocate `size` bytes. The null sentinel becomes
    /// [`BridgeError::AllocationFailed`]; nothing is freed in that case.
    pub fn allocate(module: &'m mut M, size: u32) -> Result<Self, BridgeError> {
        if size == 0 {
            return Err(BridgeError::AllocationFailed { size });
        }
        let address = module.alloc(size)?;
        if address == 0 {
            return Err(BridgeError::AllocationFailed { size });
        }
        Ok(Self {
            module,
            address,
            len: size,
            released: false,
        })
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_size(&self, actual: usize) -> Result<(), BridgeError> {
        if actual != self.len as usize {
            // Corrupted bookkeeping: fatal in debug builds
            if cfg!(debug_assertions) {
                panic!(
                    "foreign buffer size mismatch: region holds {} bytes, caller passed {}",
                    self.len, actual
                );
            }
            return Err(BridgeError::SizeMismatch {
                expected: self.len,
                actual,
            });
        }
        Ok(())
    }

    /// Write the whole source buffer into the region.
    pub fn copy_in(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        self.check_size(bytes.len())?;
        self.module.write(self.address, bytes)
    }

    /// Run a filter export over the region, which must hold exactly a
    /// `width x height` RGBA image.
    pub fn invoke(
        &mut self,
        request: &FilterRequest,
        width: u32,
        height: u32,
    ) -> Result<(), BridgeError> {
        let expected = width as u64 * height as u64 * 4;
        self.check_size(usize::try_from(expected).unwrap_or(usize::MAX))?;
        self.module.invoke(request, self.address, width, height)
    }

    /// Copy `size` bytes out into a new owned buffer that stays valid after
    /// the region is freed.
    pub fn copy_out(&mut self, size: u32) -> Result<Vec<u8>, BridgeError> {
        self.check_size(size as usize)?;
        let mut out = vec![0u8; size as usize];
        self.module.read(self.address, &mut out)?;
        Ok(out)
    }

    /// Free the region with its original size, surfacing any failure.
    pub fn release(mut self) -> Result<(), BridgeError> {
        self.released = true;
        self.module.free(self.address, self.len)
    }
}

impl<M: IsolatedModule + ?Sized> Drop for ForeignBuffer<'_, M> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.module.free(self.address, self.len) {
            warn!(
                "Failed to free foreign buffer {:#x} ({} bytes): {}",
                self.address, self.len, e
            );
        }
    }
}
