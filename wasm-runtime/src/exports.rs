//! Typed handles to the filter module's exports.
//!
//! Every function is resolved once at load time; a module missing any of
//! them, or exporting one with the wrong signature, is rejected.

use crate::runtime::ModuleState;
use anyhow::{Context, Result};
use pixelbench_shared::{FilterKind, FilterRequest};
use wasmtime::{Instance, Store, TypedFunc};

pub const ALLOC_EXPORT: &str = "alloc";
pub const FREE_EXPORT: &str = "free";
pub const MEMORY_EXPORT: &str = "memory";

/// Every function export a filter module must provide
pub const REQUIRED_EXPORTS: [&str; 9] = [
    ALLOC_EXPORT,
    FREE_EXPORT,
    "process_grayscale",
    "process_invert",
    "process_sepia",
    "process_threshold",
    "process_brightness",
    "process_blur",
    "process_sobel",
];

/// `(address, width, height)`
type PlainFilter = TypedFunc<(u32, u32, u32), ()>;

pub(crate) struct FilterExports {
    pub alloc: TypedFunc<u32, u32>,
    pub free: TypedFunc<(u32, u32), ()>,
    grayscale: PlainFilter,
    invert: PlainFilter,
    sepia: PlainFilter,
    threshold: TypedFunc<(u32, u32, u32, u32), ()>,
    brightness: TypedFunc<(u32, u32, u32, i32), ()>,
    blur: TypedFunc<(u32, u32, u32, u32), ()>,
    sobel: PlainFilter,
}

fn plain(instance: &Instance, store: &mut Store<ModuleState>, kind: FilterKind) -> Result<PlainFilter> {
    let name = kind.export_name();
    instance
        .get_typed_func(&mut *store, name)
        .with_context(|| format!("Module must export `{}(ptr: u32, width: u32, height: u32)`", name))
}

impl FilterExports {
    pub fn resolve(instance: &Instance, store: &mut Store<ModuleState>) -> Result<Self> {
        let alloc = instance
            .get_typed_func(&mut *store, ALLOC_EXPORT)
            .context("Module must export `alloc(size: u32) -> u32`")?;
        let free = instance
            .get_typed_func(&mut *store, FREE_EXPORT)
            .context("Module must export `free(ptr: u32, size: u32)`")?;
        let threshold = instance
            .get_typed_func(&mut *store, FilterKind::Threshold.export_name())
            .context("Module must export `process_threshold(ptr, width, height, threshold: u8)`")?;
        let brightness = instance
            .get_typed_func(&mut *store, FilterKind::Brightness.export_name())
            .context("Module must export `process_brightness(ptr, width, height, delta: i32)`")?;
        let blur = instance
            .get_typed_func(&mut *store, FilterKind::Blur.export_name())
            .context("Module must export `process_blur(ptr, width, height, radius: u32)`")?;

        Ok(Self {
            alloc,
            free,
            grayscale: plain(instance, store, FilterKind::Grayscale)?,
            invert: plain(instance, store, FilterKind::Invert)?,
            sepia: plain(instance, store, FilterKind::Sepia)?,
            threshold,
            brightness,
            blur,
            sobel: plain(instance, store, FilterKind::Sobel)?,
        })
    }

    /// Call the export implementing `request` on the buffer at `address`.
    pub fn call(
        &self,
        store: &mut Store<ModuleState>,
        request: &FilterRequest,
        address: u32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        match *request {
            FilterRequest::Grayscale => self.grayscale.call(store, (address, width, height)),
            FilterRequest::Invert => self.invert.call(store, (address, width, height)),
            FilterRequest::Sepia => self.sepia.call(store, (address, width, height)),
            FilterRequest::Threshold { level } => self
                .threshold
                .call(store, (address, width, height, level as u32)),
            FilterRequest::Brightness { delta } => {
                self.brightness.call(store, (address, width, height, delta))
            }
            FilterRequest::Blur { radius } => self.blur.call(store, (address, width, height, radius)),
            FilterRequest::Sobel => self.sobel.call(store, (address, width, height)),
        }
    }
}
