//! `wl_shm`: the shared-memory factory. `create_pool` is the one request in
//! the protocol subset that carries a file descriptor, so it goes through
//! the transport's ancillary-data path.

use std::os::fd::BorrowedFd;

use super::wl_shm_pool::WlShmPool;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::Argument;

#[derive(Debug)]
pub struct WlShm;

impl Interface for WlShm {
    const NAME: &'static str = "wl_shm";
}

pub const REQ_CREATE_POOL_OPCODE: u16 = 0;

// Pixel formats advertised by every compositor.
pub const FORMAT_ARGB8888: u32 = 0;
pub const FORMAT_XRGB8888: u32 = 1;

impl Proxy<WlShm> {
    /// Creates a pool backed by `fd`. The compositor receives a duplicate
    /// of the descriptor through `SCM_RIGHTS` in the same transmission as
    /// the request bytes; the caller keeps ownership of its own copy.
    pub fn create_pool(
        &self,
        conn: &mut Connection,
        fd: BorrowedFd<'_>,
        size: i32,
    ) -> Result<Proxy<WlShmPool>> {
        let pool_id = conn.allocate_id();
        conn.send_request_with_fd(
            self.id(),
            REQ_CREATE_POOL_OPCODE,
            &[Argument::NewId(pool_id), Argument::Int(size)],
            fd,
        )?;
        Ok(Proxy::from_id(pool_id))
    }
}
