use thiserror::Error;

/// Fatal conditions that abort a grading run before any output is written.
#[derive(Debug, Error)]
pub enum GradebookError {
    #[error("file not found: {0}")]
    MissingFile(String),

    #[error("file is empty or has no header line: {0}")]
    EmptyFile(String),

    #[error("required row '{0}' not found in gradebook")]
    MissingRow(String),

    #[error("row '{0}' appears more than once in gradebook")]
    DuplicateRow(String),

    #[error("invalid column layout: {0}")]
    InvalidLayout(String),

    #[error("invalid grading config: {0}")]
    InvalidConfig(String),

    #[error("output path must differ from input path: {0}")]
    SameInputOutput(String),
}
