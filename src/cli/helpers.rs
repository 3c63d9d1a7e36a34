//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::geometry::Point;

/// Load configuration honoring `--config` / `BIMTK_CONFIG`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Ok(Config::load(global.config.as_deref())?)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional measure with two decimals, or `-`
pub fn format_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Parse `x,y,z` into a point
pub fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let coords: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| format!("Invalid point: '{}'. Use x,y,z", s))?;

    match coords.as_slice() {
        [x, y, z] if coords.iter().all(|c| c.is_finite()) => Ok(Point::new(*x, *y, *z)),
        _ => Err(format!("Invalid point: '{}'. Use x,y,z", s)),
    }
}

/// Parse `KEY=PRICE` for price overrides
pub fn parse_price(s: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid price: '{}'. Use KEY=PRICE", s))?;
    let price: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid price value: '{}'", value))?;
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number: '{}'", value));
    }
    Ok((key.trim().to_string(), price))
}
