//! Free-text field checks shared by the input types

/// Reject text the store cannot hold
///
/// PostgreSQL `TEXT` columns refuse the NUL character, so it is caught here
/// as a validation error instead of failing at insert time.
pub(crate) fn check_text(field: &str, value: &str) -> Result<(), String> {
    if value.contains('\0') {
        return Err(format!("{field} must not contain NUL characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_text() {
        assert!(check_text("ward", "General").is_ok());
        assert!(check_text("ward", "Gen\u{0}eral").is_err());
        assert_eq!(
            check_text("diagnosis", "\0").unwrap_err(),
            "diagnosis must not contain NUL characters"
        );
    }
}
