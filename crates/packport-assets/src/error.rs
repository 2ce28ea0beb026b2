use std::path::PathBuf;

use packport_core::AssetReference;

/// Errors that can occur while resolving or reading assets.
///
/// None of these abort a batch: callers degrade to partial output and
/// record a note.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// `best_guess` is the first loose candidate, for diagnostics only.
    #[error("asset not found: {reference} (first candidate: {})", .best_guess.display())]
    NotFound {
        reference: AssetReference,
        best_guess: PathBuf,
    },

    #[error("malformed document '{0}': {1}")]
    MalformedDocument(PathBuf, String),

    #[error("unsupported shape in element {index}: {reason}")]
    UnsupportedShape { index: usize, reason: String },

    #[error("I/O error on '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to read archive '{0}': {1}")]
    Archive(PathBuf, String),

    #[error("unreadable image header in '{0}': {1}")]
    ImageHeader(PathBuf, String),
}
