//! Error types for boundq.

use thiserror::Error;

use crate::policy::Role;

pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Buffer capacity must be at least one slot
    #[error("Invalid capacity: {capacity} (must be greater than 0)")]
    InvalidCapacity { capacity: usize },

    /// Admission limit must allow at least one caller
    #[error("Invalid admission limit: {limit} (must be greater than 0)")]
    InvalidLimit { limit: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Too many callers already inside the wrapped policy
    #[error("Admission rejected for {role}: {limit} calls already in flight")]
    AdmissionRejected { role: Role, limit: usize },

    /// A blocked wait was cancelled through its `Interrupt`
    #[error("Interrupted while {role} was waiting")]
    Interrupted { role: Role },
}

impl QueueError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    pub fn rejected(role: Role, limit: usize) -> Self {
        Self::AdmissionRejected { role, limit }
    }

    pub fn interrupted(role: Role) -> Self {
        Self::Interrupted { role }
    }

    /// Refusals and cancellations; the caller may retry the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AdmissionRejected { .. } | Self::Interrupted { .. })
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCapacity { .. } | Self::InvalidLimit { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Role of the call that failed, for runtime outcomes.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::AdmissionRejected { role, .. } | Self::Interrupted { role } => Some(*role),
            _ => None,
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::QueueError::config(format!($($arg)*))
    };
}
