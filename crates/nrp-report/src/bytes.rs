//! Human-readable number and byte formatting

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format with thousands separators and a fixed number of decimals.
///
/// `fmt_grouped(1234567.891, 2)` → `"1,234,567.89"`. Non-finite → `"NA"`.
pub fn fmt_grouped(x: f64, decimals: usize) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    let s = format!("{:.*}", decimals, x.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut out = String::with_capacity(s.len() + int_part.len() / 3 + 1);
    if x.is_sign_negative() && s.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Binary-prefixed magnitude: `1048576.0` → `"1.00 MB"`.
///
/// Divides by 1024 while the value is at least 1024, up to PB.
pub fn fmt_bytes(n: f64) -> String {
    if !n.is_finite() {
        return "NA".to_string();
    }
    let mut value = n;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", fmt_grouped(value, 2), UNITS[unit])
}
