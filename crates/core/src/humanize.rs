//! Human-readable byte sizes
//!
//! Sizes use decimal SI units (1 kB = 1000 B). Below 10 bytes the raw count
//! is printed; otherwise the value is rounded to one decimal and the decimal
//! is dropped once the scaled value reaches 10.

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
const BASE: f64 = 1000.0;

/// Format a byte count, e.g. `2048` -> `"2.0 kB"`
pub fn human_bytes(size: u64) -> String {
    if size < 10 {
        return format!("{} B", size);
    }

    let mut exponent = 0;
    let mut whole = size;
    while whole >= 1000 && exponent < UNITS.len() - 1 {
        whole /= 1000;
        exponent += 1;
    }

    let scaled = ((size as f64 / BASE.powi(exponent as i32)) * 10.0 + 0.5).floor() / 10.0;

    if scaled < 10.0 {
        format!("{:.1} {}", scaled, UNITS[exponent])
    } else {
        format!("{:.0} {}", scaled, UNITS[exponent])
    }
}
