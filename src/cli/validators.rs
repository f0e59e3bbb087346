//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

/// Parse an integer that must be at least 1.
pub fn parse_positive_u32(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid whole number"))?;

    if value == 0 {
        return Err("value must be at least 1".to_string());
    }

    Ok(value)
}

/// Parse a step count that must be at least 1.
pub fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid whole number"))?;

    if value == 0 {
        return Err("value must be at least 1".to_string());
    }

    Ok(value)
}

/// Parse and validate a learning rate (finite, greater than zero).
pub fn parse_learning_rate(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("learning rate must be positive, got {value}"));
    }

    Ok(value)
}
