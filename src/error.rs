use std::path::PathBuf;

use scss::ScssError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Scss(#[from] ScssError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Create a type alias for convenience
pub type Result<T> = std::result::Result<T, CompileError>;
