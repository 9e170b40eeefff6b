//! Size ceiling: maps a bounded position onto a byte count.
//!
//! The mapping is a power-law interpolation between 1 KiB and 100 MiB in log
//! space, so small positions have fine resolution.

pub const MAX_POSITION: u32 = 500;
pub const DEFAULT_POSITION: u32 = 250;

const MIN_BYTES: f64 = 1024.0;
const MAX_BYTES: f64 = 100.0 * 1024.0 * 1024.0;
const EXPONENT: f64 = 1.5;

/// Positions above [`MAX_POSITION`] are clamped.
pub fn position_to_bytes(position: u32) -> u64 {
    let p = position.min(MAX_POSITION) as f64 / MAX_POSITION as f64;
    let min = MIN_BYTES.ln();
    let max = MAX_BYTES.ln();
    (min + (max - min) * p.powf(EXPONENT)).exp().round() as u64
}

pub fn human_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
