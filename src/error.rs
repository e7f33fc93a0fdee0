use thiserror::Error;

/// Failure to turn an input file into records. Aborts the whole upload.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("spreadsheet has no sheets")]
    EmptyWorkbook,
}

/// Failure to export the filtered summary set.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The active filters leave nothing to export.
    #[error("no data to export")]
    Empty,

    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("writing export: {0}")]
    Io(#[from] std::io::Error),
}
