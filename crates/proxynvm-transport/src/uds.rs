use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StreamLink;

/// Maximum socket path length.
/// `sockaddr_un.sun_path` is 108 bytes on Linux, 104 on macOS and the BSDs.
#[cfg(target_os = "linux")]
const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
const MAX_PATH_LEN: usize = 104;

/// Connect to a storage peer listening on a Unix domain socket (blocking).
pub fn connect(path: impl AsRef<Path>) -> Result<StreamLink<UnixStream>> {
    let path = path.as_ref();
    check_path_len(path)?;
    let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(?path, "connected to storage peer");
    Ok(StreamLink::new(stream))
}

/// Listening side of a Unix domain socket link.
///
/// Used by storage peers and test harnesses. The socket file is removed
/// again when the listener is dropped.
pub struct LinkListener {
    listener: UnixListener,
    path: PathBuf,
}

impl LinkListener {
    /// Permission mode applied to the socket file.
    pub const SOCKET_MODE: u32 = 0o600;

    /// Bind on `path`, replacing a stale socket file left by a dead peer.
    ///
    /// Refuses to remove anything at `path` that is not a socket.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        check_path_len(&path)?;
        let bind_err = |source| TransportError::Bind {
            path: path.clone(),
            source,
        };

        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            if !metadata.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(bind_err)?;
        }

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(Self::SOCKET_MODE))
            .map_err(bind_err)?;

        info!(?path, "listening for storage link");
        Ok(Self { listener, path })
    }

    /// Accept one link (blocking).
    pub fn accept(&self) -> Result<StreamLink<UnixStream>> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted storage link");
        Ok(StreamLink::new(stream))
    }

    /// The path this listener is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LinkListener {
    fn drop(&mut self) {
        let is_socket = std::fs::symlink_metadata(&self.path)
            .map(|m| m.file_type().is_socket())
            .unwrap_or(false);
        if is_socket {
            debug!(path = ?self.path, "cleaning up socket file");
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl std::fmt::Debug for LinkListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkListener")
            .field("path", &self.path)
            .finish()
    }
}

fn check_path_len(path: &Path) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= MAX_PATH_LEN {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}
