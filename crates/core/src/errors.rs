use thiserror::Error;

use crate::domain::intent::CanonicalMethod;

/// Non-success status from the remote service. Reported to the user, never fatal.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Error {status}: {body}")]
pub struct RemoteError {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid value for `{field}`: {reason}")]
pub struct FieldFormatError {
    pub field: String,
    pub reason: String,
}

impl FieldFormatError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("language model unavailable: {0}")]
    LlmUnavailable(String),
    #[error("Unrecognized method '{name}'. Please try again.")]
    UnknownIntent { name: String },
    #[error("{argument} is required for `{method}`")]
    MissingArgument { method: CanonicalMethod, argument: &'static str },
    #[error(transparent)]
    FieldFormat(#[from] FieldFormatError),
    #[error("transport failure talking to the CRM service: {0}")]
    Transport(String),
    #[error("terminal i/o failure: {0}")]
    Input(#[from] std::io::Error),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ShellError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::LlmUnavailable(_) => "llm_unavailable",
            Self::UnknownIntent { .. } => "unknown_intent",
            Self::MissingArgument { .. } => "missing_argument",
            Self::FieldFormat(_) => "field_format",
            Self::Transport(_) => "transport",
            Self::Input(_) => "input",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Process exit code for an invocation that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnknownIntent { .. } | Self::MissingArgument { .. } | Self::FieldFormat(_) => 0,
            Self::Configuration(_) => 2,
            Self::LlmUnavailable(_) => 3,
            Self::Transport(_) => 4,
            Self::Input(_) => 5,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.exit_code() != 0
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::intent::CanonicalMethod;
    use crate::errors::{FieldFormatError, RemoteError, ShellError};

    #[test]
    fn unknown_intent_message_names_the_method() {
        let error = ShellError::UnknownIntent { name: "launch rockets".to_owned() };

        assert_eq!(error.to_string(), "Unrecognized method 'launch rockets'. Please try again.");
        assert!(!error.is_fatal());
    }

    #[test]
    fn missing_argument_reports_argument_and_method() {
        let error =
            ShellError::MissingArgument { method: CanonicalMethod::Update, argument: "activity id" };

        assert_eq!(error.to_string(), "activity id is required for `update`");
        assert_eq!(error.exit_code(), 0);
    }

    #[test]
    fn field_format_error_converts_and_names_field() {
        let error = ShellError::from(FieldFormatError::new("deal_id", "expected an integer"));

        assert_eq!(error.to_string(), "invalid value for `deal_id`: expected an integer");
        assert_eq!(error.error_class(), "field_format");
    }

    #[test]
    fn llm_and_transport_failures_are_fatal() {
        let llm = ShellError::LlmUnavailable("connection refused".to_owned());
        let transport = ShellError::Transport("dns failure".to_owned());

        assert!(llm.is_fatal());
        assert!(transport.is_fatal());
        assert_ne!(llm.exit_code(), transport.exit_code());
    }

    #[test]
    fn remote_error_renders_status_and_body() {
        let error = RemoteError { status: 400, body: "{\"success\":false}".to_owned() };

        assert_eq!(error.to_string(), "Error 400: {\"success\":false}");
    }
}
