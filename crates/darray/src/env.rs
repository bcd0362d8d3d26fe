//! Runtime toggles read from the process environment.

use std::sync::OnceLock;

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Whether `DARRAY_PARANOID` is set, enabling extra result validation in
/// array operations.
pub fn paranoid_checks_enabled() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        std::env::var("DARRAY_PARANOID")
            .map(|v| parse_bool(&v))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn truthy_spellings_parse() {
        for v in ["1", "true", "Yes", " ON "] {
            assert!(parse_bool(v));
        }
        for v in ["0", "false", "off", ""] {
            assert!(!parse_bool(v));
        }
    }
}
