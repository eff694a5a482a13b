//! Text formatting shared by reports and detail views.

/// Rendered for any missing optional value.
pub const PLACEHOLDER: &str = "N/A";

fn group_digits(int_part: u64) -> String {
    let digits = int_part.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Thousands separators and at most two decimals, trailing zeros dropped:
/// `5000.0` -> `5,000`, `4166.67` -> `4,166.67`.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let (int_part, frac) = (cents / 100, cents % 100);
    let frac = match frac {
        0 => String::new(),
        f if f % 10 == 0 => format!(".{}", f / 10),
        f => format!(".{f:02}"),
    };
    format!("{sign}{}{frac}", group_digits(int_part))
}

/// US dollars with two decimals: `-1234.5` -> `-$1,234.50`.
pub fn usd(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_digits(cents / 100), cents % 100)
}

/// `92.5` -> `92.5%`
pub fn percent(value: f64) -> String {
    format!("{value}%")
}

/// Lowercase, runs of anything but ASCII letters and digits become one `-`.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
