//! Session event error taxonomy.

use thiserror::Error;

use crate::domain::ValidationError;

/// Why an inbound session event was refused.
///
/// A refused event mutates nothing; the reason is reported back to the
/// offending connection as an `action-rejected` event carrying [`code`].
///
/// [`code`]: SessionError::code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("room '{0}' does not exist")]
    UnknownRoom(String),

    #[error("'{username}' is not a member of room '{room_id}'")]
    NotAMember { room_id: String, username: String },

    #[error("'{username}' is not a facilitator of room '{room_id}'")]
    Unauthorized { room_id: String, username: String },

    #[error("connection has not joined a room")]
    NotJoined,

    #[error("malformed event: {0}")]
    Malformed(String),
}

impl SessionError {
    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::UnknownRoom(_) => "unknown-room",
            SessionError::NotAMember { .. } => "not-a-member",
            SessionError::Unauthorized { .. } | SessionError::NotJoined => "unauthorized-action",
            SessionError::Malformed(_) => "malformed-event",
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(SessionError::UnknownRoom("X".into()).code(), "unknown-room");
        assert_eq!(
            SessionError::NotAMember {
                room_id: "X".into(),
                username: "alice".into()
            }
            .code(),
            "not-a-member"
        );
        assert_eq!(
            SessionError::Unauthorized {
                room_id: "X".into(),
                username: "alice".into()
            }
            .code(),
            "unauthorized-action"
        );
        assert_eq!(SessionError::NotJoined.code(), "unauthorized-action");
        assert_eq!(
            SessionError::Malformed("bad".into()).code(),
            "malformed-event"
        );
    }

    #[test]
    fn test_validation_error_converts_to_malformed() {
        let err: SessionError = ValidationError::Empty("username").into();

        assert_eq!(err.code(), "malformed-event");
        assert_eq!(err.to_string(), "malformed event: username must not be empty");
    }
}
