//! Error types for the dispatch engine. Each class of failure has its own
//!  enum so callers can tell "no data" from "ambiguous data" from "bad
//!  declaration" without string matching.

use std::sync::LazyLock;

use regex::Regex;

use crate::{descriptor::ReturnShape, method_name, port::BackendError, translate};

/// A repository declaration that can never work. Raised on first use, or at
///  startup when descriptors are validated eagerly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Method `{method}` is not a builtin, carries no query and is not a derived query name: {source}")]
    UnrecognizedMethod {
        method: String,
        #[source]
        source: method_name::Error,
    },
    #[error("Method `{method}` declares the binding name `{name}` more than once")]
    DuplicateBinding { method: String, name: String },
    #[error("Method `{method}` is a {subject} query but declares a {declared:?} result")]
    ShapeMismatch {
        method: String,
        subject: &'static str,
        declared: ReturnShape,
    },
    #[error("No descriptor for method `{0}`")]
    UnknownMethod(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindingError {
    #[error("Expected {expected} argument(s), got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("Expected a single result, got more than one")]
    AmbiguousSingleResult,
    #[error("Expected a single result, got none")]
    NotFound,
    #[error("A {shape:?} result can't be built from {found}")]
    Mismatch {
        shape: ReturnShape,
        found: &'static str,
    },
}

/// Top-level error enum for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Translation error: {0}")]
    Translation(#[from] translate::Error),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Result error: {0}")]
    ResultShape(#[from] ShapeError),

    #[error("Backend error ({dialect}) running `{query}`: {source}")]
    Backend {
        dialect: translate::Dialect,
        query: String,
        #[source]
        source: BackendError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

static QUOTED_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#).expect("a valid literal pattern")
});

/// Replaces quoted literals in query text with `'?'` so that values never
///  reach logs or error messages.
pub fn redact(query: &str) -> String {
    QUOTED_LITERAL.replace_all(query, "'?'").into_owned()
}

/// Where a backend call came from, attached to backend failures.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub dialect: translate::Dialect,
    pub query: String,
}

impl QueryContext {
    pub fn new(dialect: translate::Dialect, query: &str, redact_literals: bool) -> Self {
        Self {
            dialect,
            query: if redact_literals {
                redact(query)
            } else {
                query.to_string()
            },
        }
    }

    pub fn wrap(&self, source: BackendError) -> Error {
        tracing::warn!(dialect = %self.dialect, query = %self.query, error = %source, "backend call failed");
        Error::Backend {
            dialect: self.dialect,
            query: self.query.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction() {
        assert_eq!(
            redact(r#"FOR p IN Person FILTER p.name == 'Ada' OR p.nick == "A\"d" RETURN p"#),
            "FOR p IN Person FILTER p.name == '?' OR p.nick == '?' RETURN p"
        );
        assert_eq!(redact("name = @name"), "name = @name");
        assert_eq!(redact(r"x = 'it\'s'"), "x = '?'");
    }

    #[test]
    fn backend_errors_keep_context() {
        let cx = QueryContext::new(translate::Dialect::AtNamed, "a == 'secret'", true);
        let err = cx.wrap(BackendError::new("connection reset"));
        assert_eq!(
            err.to_string(),
            "Backend error (at-named) running `a == '?'`: connection reset"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
