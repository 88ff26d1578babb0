//! Utility functions and helpers

pub mod time;

use anyhow::{Context, Result};

/// Parse image dimensions written as `WIDTHxHEIGHT` (e.g. "640x480")
pub fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let s = s.trim();
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("Expected WIDTHxHEIGHT, got {:?}", s))?;

    let width: u32 = w.trim().parse().context("Invalid width")?;
    let height: u32 = h.trim().parse().context("Invalid height")?;
    if width == 0 || height == 0 {
        anyhow::bail!("Dimensions must be non-zero: {}", s);
    }
    Ok((width, height))
}
