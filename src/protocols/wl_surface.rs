//! `wl_surface`: the raw drawing surface a window is layered on.

use super::wl_buffer::WlBuffer;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::Argument;

#[derive(Debug)]
pub struct WlSurface;

impl Interface for WlSurface {
    const NAME: &'static str = "wl_surface";
}

pub const REQ_DESTROY_OPCODE: u16 = 0;
pub const REQ_ATTACH_OPCODE: u16 = 1;
pub const REQ_DAMAGE_OPCODE: u16 = 2;
pub const REQ_COMMIT_OPCODE: u16 = 6;

impl Proxy<WlSurface> {
    pub fn attach(
        &self,
        conn: &mut Connection,
        buffer: Proxy<WlBuffer>,
        x: i32,
        y: i32,
    ) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_ATTACH_OPCODE,
            &[
                Argument::Object(buffer.id()),
                Argument::Int(x),
                Argument::Int(y),
            ],
        )
    }

    pub fn damage(
        &self,
        conn: &mut Connection,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_DAMAGE_OPCODE,
            &[
                Argument::Int(x),
                Argument::Int(y),
                Argument::Int(width),
                Argument::Int(height),
            ],
        )
    }

    pub fn commit(&self, conn: &mut Connection) -> Result<()> {
        conn.send_request(self.id(), REQ_COMMIT_OPCODE, &[])
    }

    pub fn destroy(&self, conn: &mut Connection) -> Result<()> {
        conn.send_request(self.id(), REQ_DESTROY_OPCODE, &[])
    }
}
