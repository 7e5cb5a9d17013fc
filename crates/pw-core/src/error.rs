use std::path::PathBuf;

/// Alias for `Result<T, SchemaError>`.
pub type StoryResult<T> = Result<T, SchemaError>;

/// A malformed story document. Fatal to loading: no session may start from
/// a story that fails to parse.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The story or a module file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        /// Where the document came from (file path or `story`).
        origin: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The top-level document has the wrong shape.
    #[error("{origin}: {message}")]
    Document {
        /// Where the document came from.
        origin: String,
        /// What is wrong with it.
        message: String,
    },

    /// A node is malformed.
    #[error("node '{node}': {message}")]
    Node {
        /// Node ID.
        node: String,
        /// What is wrong with it.
        message: String,
    },

    /// An `on_enter` effect is malformed (unknown kind or bad fields).
    #[error("node '{node}' on_enter effect {index}: {message}")]
    OnEnter {
        /// Node ID.
        node: String,
        /// 1-based effect index.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    /// A choice is malformed (including unknown condition/effect kinds).
    #[error("choice {index} in node '{node}': {message}")]
    Choice {
        /// Node ID.
        node: String,
        /// 1-based choice index.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    /// A start entry is malformed.
    #[error("start entry {index}: {message}")]
    Start {
        /// 1-based start index.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    /// Two nodes share an ID.
    #[error("duplicate node IDs: {}", .0.join(", "))]
    DuplicateNodes(Vec<String>),

    /// A module redefines nodes that already exist.
    #[error("{module}: node IDs already exist in the story: {}", .ids.join(", "))]
    ModuleNodeConflict {
        /// Module file.
        module: String,
        /// Conflicting node IDs.
        ids: Vec<String>,
    },

    /// A module redefines an ending with a different label.
    #[error("{module}: ending '{ending}' conflicts with an existing definition")]
    EndingConflict {
        /// Module file.
        module: String,
        /// Conflicting ending ID.
        ending: String,
    },
}
