// Error types for the wireup container

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Service not registered: {0}")]
    ServiceNotFound(String),

    #[error("Service `{service}` produces `{actual}`, requested as `{expected}`")]
    TypeMismatch {
        service: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Mocking is disabled for registry `{registry}`; cannot mock `{service}`")]
    MockingDisabled { registry: String, service: String },

    #[error("Member `{member}` of `{service}` has no mock handle")]
    NotMocked { service: String, member: String },

    #[error("Member `{0}` is not callable")]
    NotCallable(String),

    #[error("Function {0} is not implemented")]
    Unimplemented(String),

    #[error("Call rejected: {0}")]
    Rejected(Value),

    #[error("Call failed: {0}")]
    Failed(String),

    #[error("Registry has been dropped")]
    RegistryDropped,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a failure raised from inside a method body.
    pub fn failed(message: impl Into<String>) -> Self {
        Error::Failed(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unimplemented_names_member() {
        let err = Error::Unimplemented("getFiles".to_string());
        assert_eq!(err.to_string(), "Function getFiles is not implemented");
    }

    #[test]
    fn test_rejected_displays_payload() {
        let err = Error::Rejected(json!({"code": 404}));
        assert_eq!(err.to_string(), r#"Call rejected: {"code":404}"#);
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::TypeMismatch {
            service: "Helper".to_string(),
            expected: "u32",
            actual: "alloc::string::String",
        };
        assert!(err.to_string().contains("Helper"));
        assert!(err.to_string().contains("u32"));
    }
}
