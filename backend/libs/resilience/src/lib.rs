/// Resilience helpers for best-effort collaborator calls
///
/// This library provides the pieces the recommendation service needs when it
/// talks to collaborators it cannot trust to answer in time:
/// - **Timeout**: Enforces a time limit on a single call and reports a typed failure
/// - **Fallback**: Substitutes a default value for a failed best-effort call
/// - **Preset Configurations**: Pre-tuned settings for per-call and per-leg budgets
///
/// # Example: Similarity lookup with a per-call timeout
///
/// ```rust,no_run
/// use resilience::{presets, timeout::with_timeout_result};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::collaborator_config();
///
///     let result = with_timeout_result(
///         config.timeout.duration,
///         async {
///             // Your remote lookup
///             Ok::<_, String>(vec![1_u64, 2, 3])
///         }
///     ).await;
///
///     let tracks = resilience::or_fallback(result, "similar_tracks");
///     assert!(tracks.len() <= 3);
/// }
/// ```

pub mod fallback;
pub mod presets;
pub mod timeout;

// Re-export main types for convenience
pub use fallback::or_fallback;
pub use presets::{collaborator_config, online_leg_config, ServiceConfig};
pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
