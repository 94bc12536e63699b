use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the kernel's CPU accounting source.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("tick field {index} is not a number ({token:?}): {source}")]
    MalformedField {
        index: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors raised by the status HTTP listener.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to bind status listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("status listener stopped: {0}")]
    Server(#[from] io::Error),
}
