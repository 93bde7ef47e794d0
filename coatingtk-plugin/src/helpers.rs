//! Helpers for parsing raw widget input

use coatingtk_core::{CoatingError, Scale};

/// Parse a finite float, surrounding whitespace allowed
pub fn parse_float(key: &str, raw: &str) -> Result<f64, CoatingError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoatingError::invalid_value(key, raw, "a number")),
    }
}

pub fn parse_positive_float(key: &str, raw: &str) -> Result<f64, CoatingError> {
    let v = parse_float(key, raw)?;
    if v <= 0.0 {
        return Err(CoatingError::invalid_value(key, raw, "a number > 0"));
    }
    Ok(v)
}

/// Parse a sample count; anything below 2 is `INVALID_STEPS`
pub fn parse_count(key: &str, raw: &str) -> Result<i64, CoatingError> {
    let trimmed = raw.trim();
    let n = match trimmed.parse::<i64>() {
        Ok(n) => n,
        // "100.0" is accepted, "100.5" is not
        Err(_) => match parse_float(key, trimmed) {
            Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(CoatingError::invalid_value(key, raw, "an integer")),
        },
    };
    if n < 2 {
        return Err(CoatingError::invalid_steps(n));
    }
    Ok(n)
}

/// Parse `lin` or `log`
pub fn parse_scale(key: &str, raw: &str) -> Result<Scale, CoatingError> {
    Scale::parse(raw).ok_or_else(|| CoatingError::invalid_value(key, raw, "\"lin\" or \"log\""))
}

/// Parse one of a fixed set of choices, case-insensitive
pub fn parse_choice(key: &str, raw: &str, choices: &[&'static str]) -> Result<&'static str, CoatingError> {
    let trimmed = raw.trim();
    choices
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| CoatingError::invalid_value(key, raw, &format!("one of: {}", choices.join(", "))))
}
