//! Anonymous shared-memory buffers, passed to the compositor by file
//! descriptor. Backed by `memfd_create` so nothing ever touches the
//! filesystem, and mapped writable on the client side so pixel data can be
//! filled in place.

use std::ffi::CStr;
use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd};

use memmap2::MmapMut;
use nix::sys::memfd::{memfd_create, MemFdCreateFlag};
use nix::unistd::ftruncate;
use tracing::debug;

use crate::error::Result;

const SHM_NAME: &CStr = match CStr::from_bytes_with_nul(b"waylite-shm\0") {
    Ok(name) => name,
    Err(_) => panic!("name must be NUL-terminated"),
};

/// A memfd-backed region mapped into this process. The descriptor stays
/// open for the lifetime of the region so it can be handed to the
/// compositor via `wl_shm.create_pool`; both sides then see the same pages.
pub struct SharedMemoryRegion {
    file: File,
    map: MmapMut,
    size: usize,
}

impl SharedMemoryRegion {
    /// Creates a region of exactly `size` bytes, zero-filled.
    pub fn allocate(size: usize) -> Result<Self> {
        assert!(size > 0, "shared memory region cannot be empty");

        let fd = memfd_create(SHM_NAME, MemFdCreateFlag::MFD_CLOEXEC)
            .map_err(std::io::Error::from)?;
        ftruncate(&fd, size as i64).map_err(std::io::Error::from)?;
        let file = File::from(fd);
        let map = unsafe { MmapMut::map_mut(&file)? };
        debug!(size, "allocated shared memory region");
        Ok(SharedMemoryRegion { file, map, size })
    }

    /// The descriptor to send over the socket with `SCM_RIGHTS`.
    pub fn fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }
}

impl std::fmt::Debug for SharedMemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemoryRegion")
            .field("size", &self.size)
            .finish()
    }
}
