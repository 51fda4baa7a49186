use std::path::PathBuf;

/// The Wikipedia Detox dataset
pub mod detox;

/// The column layout of a delimited dataset file
#[derive(burn::config::Config, Debug)]
pub struct Schema {
    /// Zero-based index of the label column
    #[config(default = 0)]
    pub label_column: usize,

    /// Zero-based index of the text column
    #[config(default = 1)]
    pub text_column: usize,

    /// Whether the first row is a header that should be skipped
    #[config(default = true)]
    pub has_header: bool,

    /// The field delimiter
    #[config(default = "b'\\t'")]
    pub delimiter: u8,
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The file could not be opened or a record could not be read
    #[error("unable to read {path}: {source}")]
    Read {
        /// The dataset file
        path: PathBuf,

        /// The underlying reader error
        #[source]
        source: csv::Error,
    },

    /// A row did not have the column the schema asked for
    #[error("{path}:{line}: missing column {column}")]
    MissingColumn {
        /// The dataset file
        path: PathBuf,

        /// The one-based line number
        line: usize,

        /// The zero-based column index
        column: usize,
    },

    /// The label column held something that isn't a boolean or a number
    #[error("{path}:{line}: invalid label {value:?}")]
    InvalidLabel {
        /// The dataset file
        path: PathBuf,

        /// The one-based line number
        line: usize,

        /// The raw label value
        value: String,
    },
}
