//! `wl_shm_pool`: carves buffers out of a shared-memory pool.

use super::wl_buffer::WlBuffer;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::Argument;

#[derive(Debug)]
pub struct WlShmPool;

impl Interface for WlShmPool {
    const NAME: &'static str = "wl_shm_pool";
}

pub const REQ_CREATE_BUFFER_OPCODE: u16 = 0;

impl Proxy<WlShmPool> {
    pub fn create_buffer(
        &self,
        conn: &mut Connection,
        offset: i32,
        width: i32,
        height: i32,
        stride: i32,
        format: u32,
    ) -> Result<Proxy<WlBuffer>> {
        let buffer_id = conn.allocate_id();
        conn.send_request(
            self.id(),
            REQ_CREATE_BUFFER_OPCODE,
            &[
                Argument::NewId(buffer_id),
                Argument::Int(offset),
                Argument::Int(width),
                Argument::Int(height),
                Argument::Int(stride),
                Argument::Uint(format),
            ],
        )?;
        Ok(Proxy::from_id(buffer_id))
    }
}
