use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Newick syntax error
    ParseError {
        message: String,
        /// 1-based
        line: usize,
        /// 1-based
        column: usize,
        /// Input left at the point of failure
        snippet: String,
    },
    /// An internal node with more than two children
    NotBinary { node: String, children: usize },
    /// Anything else wrong with the shape of the tree or its labels
    Topology(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::ParseError {
                message,
                line,
                column,
                snippet,
            } => write!(
                f,
                "Parse error at line {}, column {}:\n{}\nSnippet: \"{}\"",
                line, column, message, snippet
            ),
            TreeError::NotBinary { node, children } => write!(
                f,
                "Node {} has {} children, the tree must be binary",
                node, children
            ),
            TreeError::Topology(msg) => write!(f, "Invalid tree: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<String> for TreeError {
    fn from(msg: String) -> Self {
        TreeError::Topology(msg)
    }
}
