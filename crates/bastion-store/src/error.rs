//! Error types for region persistence.

use std::io;
use std::path::PathBuf;

/// Errors from loading or saving a region set.
///
/// A failed load never touches previously loaded state; the caller keeps
/// whatever region set it already had.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file exists but could not be read, or the temporary file could
    /// not be written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The document is not valid YAML or has the wrong top-level shape.
    #[error("failed to parse '{}': {reason}", path.display())]
    Parse {
        /// The file involved.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// The region set could not be encoded.
    #[error("failed to serialize regions: {reason}")]
    Serialize {
        /// Encoder message.
        reason: String,
    },
    /// The temporary file could not be moved over the destination.
    #[error("failed to rename '{}' to '{}': {source}", from.display(), to.display())]
    Rename {
        /// The temporary file.
        from: PathBuf,
        /// The destination.
        to: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The store cannot apply incremental changes; save everything instead.
    #[error("store '{store}' does not support saving differences")]
    DifferenceSaveUnsupported {
        /// Name of the store.
        store: String,
    },
    /// The background saver thread could not be started.
    #[error("failed to spawn saver thread: {source}")]
    Spawn {
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The background saver is no longer running.
    #[error("saver thread has stopped")]
    SaverStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_paths() {
        let e = StoreError::Rename {
            from: PathBuf::from("/tmp/regions.yml.tmp"),
            to: PathBuf::from("/tmp/regions.yml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = e.to_string();
        assert!(text.contains("regions.yml.tmp"));
        assert!(text.ends_with("denied"));

        let e = StoreError::DifferenceSaveUnsupported {
            store: "world".into(),
        };
        assert_eq!(e.to_string(), "store 'world' does not support saving differences");
    }
}
