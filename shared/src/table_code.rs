//! Table code format: `<AREA_PREFIX>-M<NN>`
//!
//! `AREA_PREFIX` is 1-3 uppercase letters, `NN` is a zero-padded integer >= 1
//! (e.g. `T-M01`, `VIP-M12`). Validation is strict: inputs that do not match
//! are rejected.

use regex::Regex;
use std::sync::LazyLock;

static TABLE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,3}-M(\d{2,})$").expect("static regex is valid"));

/// Validate a table code against the strict format; returns the numeric
/// table number on success.
pub fn validate(code: &str) -> Result<u32, &'static str> {
    let caps = TABLE_CODE_RE.captures(code).ok_or("malformed table code")?;
    let number: u32 = caps[1].parse().map_err(|_| "table number out of range")?;
    if number == 0 {
        return Err("table number must be >= 1");
    }
    Ok(number)
}

/// Format a table code from an area prefix and table number.
pub fn format(area_prefix: &str, number: u32) -> String {
    format!("{area_prefix}-M{number:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_codes() {
        assert_eq!(validate("T-M01").unwrap(), 1);
        assert_eq!(validate("VIP-M12").unwrap(), 12);
        assert_eq!(validate("AB-M100").unwrap(), 100);
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(validate("t-m01").is_err());
        assert!(validate("TOOLONG-M01").is_err());
        assert!(validate("T-M00").is_err());
        assert!(validate("T-01").is_err());
        assert!(validate("T-M").is_err());
    }

    #[test]
    fn format_round_trips() {
        let code = format("T", 7);
        assert_eq!(code, "T-M07");
        assert_eq!(validate(&code).unwrap(), 7);
    }
}
