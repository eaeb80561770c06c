use thiserror::Error;

/// Notice text used when a failure carries no usable server message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Validation error on '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("A submission is already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Text shown to the user in an error notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Busy => self.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = ClientError::server(404, "restaurant not found");
        assert_eq!(err.user_message(), "restaurant not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        assert_eq!(
            ClientError::server(500, "  ").user_message(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            ClientError::network("connection refused").user_message(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = ClientError::validation("name", "Name is required.");
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Name is required.");
        assert_eq!(err.status(), None);
    }
}
