//! Result type alias for Wardline

use super::errors::WardlineError;

/// Result type alias for Wardline operations
///
/// This is a convenience type alias that uses `WardlineError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use wardline::domain::result::Result;
/// use wardline::domain::errors::WardlineError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(WardlineError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, WardlineError>;
