use std::path::PathBuf;

/// Errors that can occur on a storage link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind a listening socket.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the storage peer.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The link accepted fewer bytes than a frame required.
    #[error("short send: {actual} of {expected} bytes")]
    ShortSend { expected: usize, actual: usize },

    /// The link delivered fewer bytes than a frame required.
    #[error("short receive: {actual} of {expected} bytes")]
    ShortReceive { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, TransportError>;
