/// Preset configurations for collaborator calls
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for a call type
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
}

/// Single lookup against the event or similarity collaborator
///
/// - Timeout: 2s
/// - No retry (a failed seed is skipped, not repeated)
pub fn collaborator_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(2),
        },
    }
}

/// Whole online leg of a blended request
///
/// - Timeout: 2s ceiling, after which the leg resolves to empty
/// - No retry
pub fn online_leg_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(2),
        },
    }
}
