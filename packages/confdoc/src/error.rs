//! Error types for the reader.
//!
//! Uses the dual-error pattern: `ReaderError` for library consumers with
//! detailed error context, and `RegistryError` for the definition store.
//! Every `ReaderError` maps onto a [`ProblemKind`] so the problem reporter
//! can classify what went wrong without matching on variants.

use thiserror::Error;

use crate::reader::Problem;
use crate::registry::RegistryError;

/// Classification of reported problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Missing or malformed attribute/element (e.g. empty import location).
    Structural,
    /// A resource could not be found, read or parsed.
    Resolution,
    /// The location of the importing document itself could not be determined.
    CurrentLocation,
    /// The registry refused a definition or alias.
    RegistryConflict,
    /// No handler is registered for a non-default namespace.
    UnrecognizedExtension,
    /// Reader or environment configuration is invalid.
    Configuration,
}

impl ProblemKind {
    /// Short lowercase label used in CLI output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Resolution => "resolution",
            Self::CurrentLocation => "current-location",
            Self::RegistryConflict => "registry-conflict",
            Self::UnrecognizedExtension => "unrecognized-extension",
            Self::Configuration => "configuration",
        }
    }
}

/// Main error type for the reader library.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Missing or malformed attribute or element.
    #[error("{0}")]
    Structural(String),

    /// A `${...}` placeholder has no value and no default.
    #[error("Could not resolve placeholder '{placeholder}' in value \"{text}\"")]
    UnresolvablePlaceholder { placeholder: String, text: String },

    /// A placeholder refers back to itself through its own value.
    #[error("Circular placeholder reference '{0}' in property definitions")]
    CircularPlaceholder(String),

    /// Loading an imported document failed.
    #[error("Failed to import definitions from {kind} location [{location}]")]
    ImportFailed {
        kind: &'static str,
        location: String,
        #[source]
        source: Box<ReaderError>,
    },

    /// The importing document's own location could not be used as a base.
    #[error("Failed to resolve current resource location [{location}]")]
    CurrentLocation {
        location: String,
        #[source]
        source: Box<ReaderError>,
    },

    /// The resource does not have a URL to resolve relative paths against.
    #[error("{0} cannot be resolved to a URL")]
    NoBaseLocation(String),

    /// The resource does not exist.
    #[error("{0} does not exist")]
    ResourceNotFound(String),

    /// The resource location could not be interpreted by the loader.
    #[error("Unsupported resource location [{0}]")]
    UnsupportedLocation(String),

    /// A document imports itself, directly or through other documents.
    #[error("Detected cyclic loading of {0}: check your import definitions")]
    CyclicImport(String),

    /// The registry rejected a definition or alias.
    #[error("{message}")]
    RegistryConflict {
        message: String,
        #[source]
        source: RegistryError,
    },

    /// No namespace handler is registered for the element's namespace.
    #[error("Unable to locate namespace handler for XML schema namespace [{namespace}] (element <{element}>)")]
    UnrecognizedExtension { namespace: String, element: String },

    /// XML parsing failed.
    #[error("XML document from {resource} is invalid")]
    XmlParse {
        resource: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Invalid wildcard pattern in a resource location.
    #[error("Invalid resource pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// Directory traversal failed while matching a resource pattern.
    #[error("Failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts exhausted for a remote resource.
    #[error("Failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A problem was escalated by a fail-fast problem reporter.
    #[error("Configuration problem: {0}")]
    Escalated(Box<Problem>),
}

impl ReaderError {
    /// Classify this error for problem reporting.
    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        match self {
            Self::Structural(_) => ProblemKind::Structural,
            Self::CurrentLocation { .. } => ProblemKind::CurrentLocation,
            Self::RegistryConflict { .. } => ProblemKind::RegistryConflict,
            Self::UnrecognizedExtension { .. } => ProblemKind::UnrecognizedExtension,
            Self::Yaml(_) => ProblemKind::Configuration,
            Self::Escalated(problem) => problem.kind,
            Self::UnresolvablePlaceholder { .. }
            | Self::CircularPlaceholder(_)
            | Self::ImportFailed { .. }
            | Self::NoBaseLocation(_)
            | Self::ResourceNotFound(_)
            | Self::UnsupportedLocation(_)
            | Self::CyclicImport(_)
            | Self::XmlParse { .. }
            | Self::Pattern(_)
            | Self::Walk(_)
            | Self::Url(_)
            | Self::Http(_)
            | Self::RetriesExhausted { .. }
            | Self::Io(_) => ProblemKind::Resolution,
        }
    }

    /// Shorthand for a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }
}

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReaderError::structural("Resource location must not be empty");
        assert_eq!(err.to_string(), "Resource location must not be empty");
        assert_eq!(err.kind(), ProblemKind::Structural);
    }

    #[test]
    fn test_import_failed_keeps_cause() {
        let err = ReaderError::ImportFailed {
            kind: "relative",
            location: "other.xml".to_string(),
            source: Box::new(ReaderError::ResourceNotFound("file [/tmp/other.xml]".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Failed to import definitions from relative location [other.xml]"
        );
        let cause = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("file [/tmp/other.xml] does not exist"));
        assert_eq!(err.kind(), ProblemKind::Resolution);
    }

    #[test]
    fn test_current_location_is_distinct_kind() {
        let err = ReaderError::CurrentLocation {
            location: "other.xml".to_string(),
            source: Box::new(ReaderError::NoBaseLocation("inline document [x]".to_string())),
        };
        assert_eq!(err.kind(), ProblemKind::CurrentLocation);
    }

    #[test]
    fn test_unrecognized_extension_display() {
        let err = ReaderError::UnrecognizedExtension {
            namespace: "http://example.com/cache".to_string(),
            element: "cache:region".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to locate namespace handler for XML schema namespace [http://example.com/cache] (element <cache:region>)"
        );
    }
}
