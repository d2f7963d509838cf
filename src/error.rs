use thiserror::Error;

/// Errors from the pure data-wrangling core. Rendering/export errors are
/// propagated unmodified through `anyhow` at the CLI layer.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed input: {reason} (row {row}, column '{column}')")]
    MalformedInput {
        reason: String,
        row: usize,
        column: String,
    },

    #[error("invalid selection size: requested {requested} traits, {available} distinct traits available")]
    InvalidSelectionSize { requested: usize, available: usize },

    #[error("unknown trait column '{0}'")]
    UnknownTraitName(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;
