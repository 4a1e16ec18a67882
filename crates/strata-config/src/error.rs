//! Configuration error types.

/// Errors that can occur when loading, saving, parsing, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A table references a block symbol that is not in the block table.
    #[error("{context} references undefined block symbol {symbol:?}")]
    UndefinedBlock {
        /// Where the symbol was referenced (e.g. "ore `coal`").
        context: String,
        /// The missing symbol.
        symbol: char,
    },

    /// A value is out of range or the tables are inconsistent.
    #[error("invalid world generation config: {0}")]
    Invalid(String),
}
