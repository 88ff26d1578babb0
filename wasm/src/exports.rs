//! Raw export surface consumed by the host bridge.

use crate::{buffer_len, filters};
use std::alloc::{alloc as raw_alloc, dealloc, Layout};
use std::slice;

/// Allocate `size` bytes for the host. Returns null (0) on failure.
#[no_mangle]
pub extern "C" fn alloc(size: u32) -> *mut u8 {
    if size == 0 {
        return std::ptr::null_mut();
    }
    match Layout::from_size_align(size as usize, 1) {
        Ok(layout) => unsafe { raw_alloc(layout) },
        Err(_) => std::ptr::null_mut(),
    }
}

/// Release a region obtained from `alloc` with the same `size`.
#[no_mangle]
pub extern "C" fn free(ptr: *mut u8, size: u32) {
    if ptr.is_null() || size == 0 {
        return;
    }
    if let Ok(layout) = Layout::from_size_align(size as usize, 1) {
        unsafe { dealloc(ptr, layout) }
    }
}

/// Rebuild the pixel slice the host placed at `ptr`.
///
/// # Safety
/// `ptr` must come from `alloc(width * height * 4)` and still be live.
unsafe fn pixels<'a>(ptr: *mut u8, width: u32, height: u32) -> Option<&'a mut [u8]> {
    let len = buffer_len(width, height)?;
    if ptr.is_null() || len == 0 {
        return None;
    }
    Some(slice::from_raw_parts_mut(ptr, len))
}

#[cfg(feature = "trace")]
mod env {
    #[link(wasm_import_module = "env")]
    extern "C" {
        pub fn log(ptr: *const u8, len: u32);
        pub fn get_timestamp() -> u64;
    }
}

/// Run `filter` and report its duration through `env.log`.
#[cfg(feature = "trace")]
fn traced(name: &str, filter: impl FnOnce()) {
    let start = unsafe { env::get_timestamp() };
    filter();
    let end = unsafe { env::get_timestamp() };
    let msg = crate::trace_line(name, start, end);
    unsafe { env::log(msg.as_ptr(), msg.len() as u32) }
}

#[cfg(not(feature = "trace"))]
#[inline(always)]
fn traced(_name: &str, filter: impl FnOnce()) {
    filter()
}

#[no_mangle]
pub unsafe extern "C" fn process_grayscale(ptr: *mut u8, width: u32, height: u32) {
    traced("grayscale", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::grayscale(data);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_invert(ptr: *mut u8, width: u32, height: u32) {
    traced("invert", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::invert(data);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_sepia(ptr: *mut u8, width: u32, height: u32) {
    traced("sepia", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::sepia(data);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_threshold(ptr: *mut u8, width: u32, height: u32, threshold: u8) {
    traced("threshold", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::threshold(data, threshold);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_brightness(ptr: *mut u8, width: u32, height: u32, delta: i32) {
    traced("brightness", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::brightness(data, delta);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_blur(ptr: *mut u8, width: u32, height: u32, radius: u32) {
    traced("blur", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::blur(data, width as usize, height as usize, radius as usize);
        }
    });
}

#[no_mangle]
pub unsafe extern "C" fn process_sobel(ptr: *mut u8, width: u32, height: u32) {
    traced("sobel", || {
        if let Some(data) = pixels(ptr, width, height) {
            filters::sobel(data, width as usize, height as usize);
        }
    });
}
