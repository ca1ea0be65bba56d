use serde::{Deserialize, Serialize};

/// A struct that represents an error with a context and possibly the propagated source error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContextError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error.to_string()),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }
}

/// The two kinds of failure the generation of a document can end with.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum GenerationError {
    /// No rendering collaborator is available in this build, nothing has been written.
    MissingDependency {
        /// The name of the missing collaborator.
        collaborator: String,
        /// What the user should do in order to make it available.
        hint: String,
    },
    /// Any other failure while placing the text or saving the document.
    GenerationFailure(ContextError),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::MissingDependency { collaborator, .. } => {
                write!(formatter, "{} not available", collaborator)
            }
            GenerationError::GenerationFailure(error) => {
                write!(formatter, "Error creating PDF: {}", error)
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::MissingDependency { .. } => None,
            GenerationError::GenerationFailure(error) => Some(error),
        }
    }
}

impl From<ContextError> for GenerationError {
    fn from(error: ContextError) -> Self {
        GenerationError::GenerationFailure(error)
    }
}

impl GenerationError {
    /// The remediation hint, only missing dependencies carry one.
    pub fn hint(&self) -> Option<&str> {
        match self {
            GenerationError::MissingDependency { hint, .. } => Some(hint),
            GenerationError::GenerationFailure(_) => None,
        }
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_is_minimized_after_the_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "Disk is full");
        let error = ContextError::with_error("Failed to write the document", &io_error);

        assert_eq!(error.to_string(), "Failed to write the document: disk is full");
    }

    #[test]
    fn generation_failure_carries_its_cause() {
        let error: GenerationError = ContextError::with_context("Failed to save").into();

        assert_eq!(error.to_string(), "Error creating PDF: Failed to save");
        assert!(error.hint().is_none());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn missing_dependency_exposes_a_hint() {
        let error = GenerationError::MissingDependency {
            collaborator: "lopdf".into(),
            hint: "cargo build --features lopdf-renderer".into(),
        };

        assert_eq!(error.to_string(), "lopdf not available");
        assert_eq!(error.hint(), Some("cargo build --features lopdf-renderer"));
    }

    #[test]
    fn errors_serialize_to_json() {
        let error = GenerationError::GenerationFailure(ContextError::with_context("Oops"));
        let json = serde_json::to_string(&error).unwrap();

        assert_eq!(
            json,
            r#"{"GenerationFailure":{"context":"Oops","source_error":null}}"#
        );
    }
}
