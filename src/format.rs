use std::str;

use crate::base::{self, Base};
use crate::parse::Mode;

/// Significant digits kept for a committed result
pub const DISPLAY_DIGITS: i32 = 12;
/// Significant digits kept for the live preview
pub const PREVIEW_DIGITS: i32 = 8;

const F64_BUF_LEN: usize = 48;

// Shortest decimal string that round-trips back to the same f64
fn shortest_f64(g: f64) -> String {
    let mut buf = [b'\0'; F64_BUF_LEN];
    match dtoa::write(&mut buf[..], g) {
        Ok(len) => match str::from_utf8(&buf[..len]) {
            Ok(s) => s.to_string(),
            Err(..) => format!("{}", g),
        },
        Err(..) => format!("{}", g),
    }
}

// Rounds to the given number of significant decimal digits. This is what
// strips artifacts like 0.30000000000000004 before display.
fn round_significant(v: f64, digits: i32) -> f64 {
    if v == 0.0 || !v.is_finite() {
        return v;
    }
    let exp = v.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - exp);
    (v * factor).round() / factor
}

fn non_finite(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

fn format_scientific(v: f64, digits: i32) -> String {
    if !v.is_finite() {
        return non_finite(v).to_string();
    }
    let rounded = round_significant(v, digits);
    // integral values drop the decimal point; 1e21 keeps the cutoff at
    // the point where plain digit strings stop being readable
    if rounded == rounded.trunc() && rounded.abs() < 1e21 {
        if let Ok(i) = base::f64_to_int(rounded) {
            return i.to_string();
        }
    }
    let s = shortest_f64(rounded);
    match s.strip_suffix(".0") {
        Some(head) => head.to_string(),
        None => s,
    }
}

/// Formats a committed result for display. Scientific mode rounds to 12
/// significant digits and renders the shortest round-trip decimal;
/// Programmer mode floors toward negative infinity and renders in the
/// active base. NaN and the infinities display as their literal names.
pub fn format_value(v: f64, mode: Mode, base: Base) -> String {
    match mode {
        Mode::Scientific => format_scientific(v, DISPLAY_DIGITS),
        Mode::Programmer => {
            if !v.is_finite() {
                return non_finite(v).to_string();
            }
            match base::f64_to_int(v.floor()) {
                Ok(i) => base::decimal_to_digits(&i, base),
                Err(..) => non_finite(v).to_string(),
            }
        }
    }
}

/// Formats a live-preview value: 8 significant digits instead of 12
pub fn format_preview(v: f64) -> String {
    format_scientific(v, PREVIEW_DIGITS)
}
