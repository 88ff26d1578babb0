//! In-process filter module backed by the natively built guest library.
//!
//! Mirrors the WASM export surface over a plain `Vec<u8>` "linear memory" and
//! keeps a ledger of live regions so tests can check alloc/free pairing.

#![allow(dead_code)]

use pixelbench_guest::filters;
use pixelbench_shared::FilterRequest;
use pixelbench_wasm::{BridgeError, IsolatedModule};
use std::collections::BTreeMap;

/// First address handed out; 0 is the failure sentinel
const HEAP_BASE: u32 = 1024;

#[derive(Debug, Default)]
pub struct NativeModule {
    memory: Vec<u8>,
    next: u32,
    /// Live regions: address -> size
    pub live: BTreeMap<u32, u32>,
    /// Every `(address, size)` passed to free, in order
    pub freed: Vec<(u32, u32)>,
    pub alloc_calls: u64,
    /// Largest memory this module may grow to
    pub capacity: Option<usize>,
    /// Make every filter export fail
    pub trap_on_invoke: bool,
}

impl NativeModule {
    pub fn new() -> Self {
        Self {
            memory: vec![0; HEAP_BASE as usize],
            next: HEAP_BASE,
            ..Default::default()
        }
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::new()
        }
    }

    fn region(&mut self, address: u32, len: usize) -> Result<&mut [u8], BridgeError> {
        let start = address as usize;
        self.memory
            .get_mut(start..start + len)
            .ok_or(BridgeError::MemoryAccess { address, len })
    }
}

impl IsolatedModule for NativeModule {
    fn alloc(&mut self, size: u32) -> Result<u32, BridgeError> {
        self.alloc_calls += 1;
        let address = self.next;
        let end = address as usize + size as usize;
        if size == 0 || self.capacity.is_some_and(|cap| end > cap) {
            return Ok(0);
        }
        if end > self.memory.len() {
            self.memory.resize(end, 0);
        }
        self.next = end as u32;
        self.live.insert(address, size);
        Ok(address)
    }

    fn free(&mut self, address: u32, size: u32) -> Result<(), BridgeError> {
        let recorded = self.live.remove(&address);
        assert_eq!(recorded, Some(size), "free({:#x}, {}) does not match alloc", address, size);
        self.freed.push((address, size));
        if self.live.is_empty() {
            self.next = HEAP_BASE;
        }
        Ok(())
    }

    fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), BridgeError> {
        self.region(address, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, address: u32, out: &mut [u8]) -> Result<(), BridgeError> {
        let len = out.len();
        out.copy_from_slice(self.region(address, len)?);
        Ok(())
    }

    fn invoke(
        &mut self,
        request: &FilterRequest,
        address: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BridgeError> {
        if self.trap_on_invoke {
            return Err(BridgeError::Invoke {
                export: request.kind().export_name(),
                source: anyhow::anyhow!("wasm trap: unreachable"),
            });
        }
        let (w, h) = (width as usize, height as usize);
        let data = self.region(address, w * h * 4)?;
        match *request {
            FilterRequest::Grayscale => filters::grayscale(data),
            FilterRequest::Invert => filters::invert(data),
            FilterRequest::Sepia => filters::sepia(data),
            FilterRequest::Threshold { level } => filters::threshold(data, level),
            FilterRequest::Brightness { delta } => filters::brightness(data, delta),
            FilterRequest::Blur { radius } => filters::blur(data, w, h, radius as usize),
            FilterRequest::Sobel => filters::sobel(data, w, h),
        }
        Ok(())
    }

    fn memory_size(&self) -> usize {
        self.memory.len()
    }
}
