//! Setting value validation.

use barcode_engine::config::MAX_DPI;
use regex::Regex;
use std::sync::LazyLock;

static RE_FONT_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(ttf|otf|ttc)$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "BIND_ADDRESS" => {
            value
                .parse::<std::net::IpAddr>()
                .map_err(|_| "must be an IPv4 or IPv6 address")?;
        }
        "DEFAULT_DPI" => validate_int_range(value, 1, i64::from(MAX_DPI))?,
        "JPEG_QUALITY" => validate_int_range(value, 1, 100)?,
        "MAX_ROWS" => validate_int_range(value, 1, 100_000)?,
        "MAX_BODY_BYTES" => validate_int_range(value, 1024, 256 * 1024 * 1024)?,
        "CAPTION_FONT_PATH" => {
            if !value.is_empty() && !RE_FONT_FILE.is_match(value) {
                return Err("font must be a .ttf, .otf or .ttc file".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
