use conference_roster_config::ConfigError;
use conference_roster_database::DatabaseError;

/// A feed that cannot be turned into records. Any of these aborts the whole
/// import; rows are numbered from 1, not counting the header.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ImportError {
    #[error("feed is missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("row {row} has {found} cells but the header has {expected} columns")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row} lists a class before any registration row")]
    OrphanClassRow { row: usize },
    #[error("row {row} has an unrecognized event description {description:?}")]
    UnrecognizedEvent { row: usize, description: String },
    #[error("row {row} has an invalid number {value:?} in column {column:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row} has an unknown program {value:?}")]
    UnknownProgram { row: usize, value: String },
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("import error: {0}")]
    Import(#[from] ImportError),
    #[error(
        "refusing to sync {collection}: the feed has {size} records but at least {minimum} are \
         required. Is the export truncated?"
    )]
    BatchTooSmall {
        collection: &'static str,
        size: usize,
        minimum: usize,
    },
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
