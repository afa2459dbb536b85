//! Typed error definitions for Bricksync.
//!
//! Errors are serializable so they can travel inside persisted sync reports,
//! and matchable so callers can branch on the failure kind.

mod config;
mod sync;

pub use config::ConfigError;
pub use sync::SyncError;

/// Standard Result type using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = SyncError::RemoteStatus { status: 500, body: "boom".to_string() };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("RemoteStatus"));
        assert!(json.contains("boom"));

        let deserialized: SyncError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::Transport { attempts: 4, message: "connection refused".to_string() };

        let msg = format!("{}", err);
        assert!(msg.contains("4 attempts"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_config_error_from_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ConfigError::parse(&parse);
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.field(), None);
        assert_eq!(ConfigError::invalid("batch_size", "must be at least 1").field(), Some("batch_size"));
    }
}
