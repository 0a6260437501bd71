//! Blocking Unix-domain-socket transport to the compositor, including the
//! ancillary-data path that carries a shared-memory file descriptor.

use std::env;
use std::io::{self, IoSlice, Read, Write};
use std::os::fd::{AsRawFd, BorrowedFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use nix::sys::socket::{sendmsg, ControlMessage, MsgFlags};
use tracing::{info, trace};

use crate::error::{Result, WaylandClientError};

const DEFAULT_DISPLAY_NAME: &str = "wayland-0";

/// Resolves the compositor socket path from the environment:
/// `$XDG_RUNTIME_DIR/$WAYLAND_DISPLAY`, with the display name defaulting to
/// `wayland-0`. A missing runtime dir is a hard failure.
pub fn display_socket_path() -> Result<PathBuf> {
    let runtime_dir = env::var_os("XDG_RUNTIME_DIR").ok_or_else(|| {
        WaylandClientError::Connection("XDG_RUNTIME_DIR is not set in the environment".into())
    })?;
    let display = env::var("WAYLAND_DISPLAY").unwrap_or_else(|_| DEFAULT_DISPLAY_NAME.to_owned());
    Ok(PathBuf::from(runtime_dir).join(display))
}

/// A connected stream socket to the compositor. Construction is connection:
/// an unconnected socket is unrepresentable, so every send/receive below is
/// known to operate on a live stream. Dropping the socket closes it.
#[derive(Debug)]
pub struct WaylandSocket {
    stream: UnixStream,
}

impl WaylandSocket {
    /// Connects using the environment-resolved socket path.
    pub fn connect() -> Result<Self> {
        Self::connect_to(&display_socket_path()?)
    }

    pub fn connect_to(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path).map_err(|e| {
            WaylandClientError::Connection(format!("cannot connect to {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "connected to compositor socket");
        Ok(WaylandSocket { stream })
    }

    /// Wraps an already-connected stream. Used by tests to substitute a
    /// scripted peer for a real compositor.
    pub fn from_stream(stream: UnixStream) -> Self {
        WaylandSocket { stream }
    }

    /// Writes `bytes` with a single system call. A short write would tear a
    /// message frame, so it is reported as an I/O error.
    pub fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        let sent = self.stream.write(bytes)?;
        if sent != bytes.len() {
            return Err(WaylandClientError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {sent} of {} bytes", bytes.len()),
            )));
        }
        trace!(len = sent, "sent");
        Ok(sent)
    }

    /// Writes `bytes` and attaches `fd` as an `SCM_RIGHTS` control message
    /// in the same `sendmsg` call, so the compositor receives the duplicate
    /// descriptor atomically with the request that references it.
    pub fn send_with_fd(&mut self, bytes: &[u8], fd: BorrowedFd<'_>) -> Result<usize> {
        let iov = [IoSlice::new(bytes)];
        let fds = [fd.as_raw_fd()];
        let cmsgs = [ControlMessage::ScmRights(&fds)];
        let sent = sendmsg::<()>(
            self.stream.as_raw_fd(),
            &iov,
            &cmsgs,
            MsgFlags::empty(),
            None,
        )
        .map_err(io::Error::from)?;
        if sent != bytes.len() {
            return Err(WaylandClientError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short sendmsg: {sent} of {} bytes", bytes.len()),
            )));
        }
        trace!(len = sent, fd = fds[0], "sent with descriptor");
        Ok(sent)
    }

    /// Blocks until at least one byte is available and returns the byte
    /// count read by a single system call. A zero-byte read means the
    /// compositor hung up, which is unrecoverable.
    pub fn receive_blocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        let read = self.stream.read(buf)?;
        if read == 0 {
            return Err(WaylandClientError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compositor closed the connection",
            )));
        }
        trace!(len = read, "received");
        Ok(read)
    }
}
