/// Substitution policy for best-effort calls
use std::fmt::Display;
use tracing::warn;

/// Returns the successful value, or `T::default()` when the call failed.
///
/// The failure is logged with the operation name and then dropped; it never
/// reaches the caller.
pub fn or_fallback<T, E>(result: Result<T, E>, operation: &str) -> T
where
    T: Default,
    E: Display,
{
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(operation = operation, error = %e, "Best-effort call failed, using fallback");
            T::default()
        }
    }
}
