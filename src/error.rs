//! Error types for the hw provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the host stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not implemented for this resource type.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request from the host.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Io(_err) => "i/o error (see Debug output)",
            Self::Unimplemented(msg) => msg,
            Self::InvalidRequest(msg) => msg,
        }
    }

    /// Turn this error into an error diagnostic for the host.
    pub fn into_diagnostic(self) -> Diagnostic {
        let summary = match &self {
            Self::Validation(_) => "Invalid resource configuration",
            Self::Configuration(_) => "Invalid provider configuration",
            Self::UnknownResource(_) => "Unknown type",
            Self::Unimplemented(_) => "Operation not supported",
            Self::NotFound(_) => "Resource not found",
            Self::Serialization(_) | Self::InvalidRequest(_) => "Malformed request",
            Self::Io(_) => "Provider I/O failure",
        };
        Diagnostic::error(summary).with_detail(self.to_string())
    }

    /// Collapse error diagnostics into a single validation error.
    ///
    /// Returns `Ok(())` when none of the diagnostics is an error, so warnings
    /// never abort an operation.
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Result<(), Self> {
        let messages: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| match &d.detail {
                Some(detail) => format!("{}: {}", d.summary, detail),
                None => d.summary.clone(),
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(messages.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("bread-rye-3".to_string());
        assert_eq!(format!("{}", err), "Resource not found: bread-rye-3");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("hw_toaster".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: hw_toaster");

        let err = ProviderError::Unimplemented("import of hw_store".to_string());
        assert_eq!(format!("{}", err), "Unimplemented: import of hw_store");
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("upcharge must not be negative".to_string());
        assert_eq!(err.message(), "upcharge must not be negative");

        let err = ProviderError::InvalidRequest("bad request".to_string());
        assert_eq!(err.message(), "bad request");
    }

    #[test]
    fn test_into_diagnostic() {
        let diag = ProviderError::Validation("ice: too many blocks".to_string()).into_diagnostic();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Invalid resource configuration");
        assert_eq!(
            diag.detail,
            Some("Validation error: ice: too many blocks".to_string())
        );
    }

    #[test]
    fn test_from_diagnostics_ignores_warnings() {
        let diagnostics = vec![Diagnostic::warning("kind is unusual")];
        assert!(ProviderError::from_diagnostics(&diagnostics).is_ok());

        let diagnostics = vec![
            Diagnostic::warning("kind is unusual"),
            Diagnostic::error("Missing ice").with_detail("exactly one block is required"),
            Diagnostic::error("Negative quantity"),
        ];
        let err = ProviderError::from_diagnostics(&diagnostics).unwrap_err();
        assert_eq!(
            err.message(),
            "Missing ice: exactly one block is required; Negative quantity"
        );
    }
}
