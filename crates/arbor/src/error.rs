//! Error types for Arbor.

use std::path::PathBuf;

/// Result type alias for Arbor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for pattern parsing and compilation.
pub type PatternResult<T> = std::result::Result<T, PatternError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised while parsing a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern contains no segments.
    #[error("empty path pattern")]
    EmptyPattern,

    /// Two separators with nothing in between.
    #[error("empty segment in pattern '{pattern}'")]
    EmptySegment { pattern: String },

    /// A bracket is opened and never closed, closed twice, or stray.
    #[error("unbalanced brackets in segment '{segment}'")]
    UnbalancedBracket { segment: String },

    /// `[` with no name in front of it.
    #[error("missing name before '[' in segment '{segment}'")]
    MissingName { segment: String },

    /// `*` or `...` followed by an index expression.
    #[error("'{segment}' cannot carry indices")]
    IndexedWildcard { segment: String },

    /// An index expression term (or list) with nothing in it.
    #[error("empty index term in segment '{segment}'")]
    EmptyTerm { segment: String },

    /// A component that is not a non-negative integer.
    #[error("invalid integer '{text}' in index term '{term}'")]
    InvalidInteger { term: String, text: String },

    /// A negative integer; hierarchy indices are ordinals.
    #[error("negative index '{text}' in index term '{term}'")]
    NegativeIndex { term: String, text: String },

    /// `a:b:c:d` and longer.
    #[error("too many slice parts in '{term}'")]
    TooManySliceParts { term: String },

    /// A slice step of zero.
    #[error("slice step must be positive in '{term}'")]
    InvalidStep { term: String },
}

impl PatternError {
    /// Create an unbalanced-bracket error.
    pub fn unbalanced(segment: impl Into<String>) -> Self {
        Self::UnbalancedBracket {
            segment: segment.into(),
        }
    }

    /// Create an invalid-integer error.
    pub fn invalid_integer(term: impl Into<String>, text: impl Into<String>) -> Self {
        Self::InvalidInteger {
            term: term.into(),
            text: text.into(),
        }
    }
}

/// Errors raised by a [`HierarchyStore`](crate::store::HierarchyStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No node at the path.
    #[error("no node at '{path}'")]
    NotFound { path: String },

    /// A node already exists at the path.
    #[error("a node already exists at '{path}'")]
    AlreadyExists { path: String },

    /// The node at the path is a leaf where a container was required.
    #[error("'{path}' is not a container")]
    NotAContainer { path: String },

    /// The path is malformed for this operation.
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// The attribute key (or a step of a nested key chain) does not exist.
    #[error("no attribute '{key}' on '{path}'")]
    AttrNotFound { path: String, key: String },

    /// Snapshot file I/O failed.
    #[error("failed to access store snapshot '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot (de)serialization failed.
    #[error("store snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(path: impl ToString) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }

    /// Create an already-exists error.
    pub fn already_exists(path: impl ToString) -> Self {
        Self::AlreadyExists {
            path: path.to_string(),
        }
    }

    /// Create a not-a-container error.
    pub fn not_a_container(path: impl ToString) -> Self {
        Self::NotAContainer {
            path: path.to_string(),
        }
    }

    /// Create an invalid-path error.
    pub fn invalid_path(path: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create an attribute-not-found error.
    pub fn attr_not_found(path: impl ToString, key: impl ToString) -> Self {
        Self::AttrNotFound {
            path: path.to_string(),
            key: key.to_string(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while loading a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid TOML or has wrongly typed fields.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level error for Arbor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pattern error.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Config error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
