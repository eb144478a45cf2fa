//! Structured logging configuration.
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here forwards those records alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tourney_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `username` - Account the event concerns, if known
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use tourney_server::logging::log_security_event;
///
/// log_security_event("failed_login", Some("alice"), "Invalid credentials");
/// ```
pub fn log_security_event(event_type: &str, username: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        username = username,
        "SECURITY: {}",
        message
    );
}

/// Log API request/response
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if status_code >= 500 {
        tracing::error!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some("alice"), "Test message");
        log_security_event("test_event", None, "Test message");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("GET", "/api/v1/tournaments", 200, 45);
        log_api_request("POST", "/api/v1/auth/login", 500, 120);
    }
}
