use thiserror::Error;

pub type FuelmapResult<T> = Result<T, FuelmapError>;

/// Fatal errors. Any of these aborts the run before an artifact is produced.
#[derive(Error, Debug)]
pub enum FuelmapError {
    #[error("Cannot read source data: {0}")]
    SourceRead(String),

    #[error("Source data has {found} columns, at least {required} are required")]
    SourceSchema { found: usize, required: usize },

    #[error("Cannot read template: {0}")]
    TemplateRead(String),

    #[error("Invalid profile: {0}")]
    Profile(String),

    #[error("Failed to serialize output workbook: {0}")]
    Output(String),

    #[error("Template export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FuelmapError {
    /// True for errors caused by the uploaded artifacts rather than the deployment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FuelmapError::SourceRead(_)
                | FuelmapError::SourceSchema { .. }
                | FuelmapError::TemplateRead(_)
        )
    }
}

/// Recoverable per-field failure. The field is left unset and the row continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowFieldError {
    #[error("unparseable timestamp '{0}'")]
    UnparseableTimestamp(String),

    #[error("unsupported timestamp cell ({0})")]
    UnsupportedTimestamp(String),

    #[error("column offset {offset} is outside the row (width {width})")]
    OutOfRange { offset: usize, width: usize },

    #[error("source cell holds an error value ({0})")]
    CellError(String),
}
