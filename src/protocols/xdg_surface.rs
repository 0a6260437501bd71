//! `xdg_surface`: window semantics layered on a `wl_surface`, including the
//! configure/ack handshake that gates the first buffer commit.

use super::xdg_toplevel::XdgToplevel;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::{read_u32, Argument};

#[derive(Debug)]
pub struct XdgSurface;

impl Interface for XdgSurface {
    const NAME: &'static str = "xdg_surface";
}

pub const REQ_DESTROY_OPCODE: u16 = 0;
pub const REQ_GET_TOPLEVEL_OPCODE: u16 = 1;
pub const REQ_SET_WINDOW_GEOMETRY_OPCODE: u16 = 3;
pub const REQ_ACK_CONFIGURE_OPCODE: u16 = 4;

pub const EVT_CONFIGURE_OPCODE: u16 = 0;

impl Proxy<XdgSurface> {
    pub fn get_toplevel(&self, conn: &mut Connection) -> Result<Proxy<XdgToplevel>> {
        let toplevel_id = conn.allocate_id();
        conn.send_request(
            self.id(),
            REQ_GET_TOPLEVEL_OPCODE,
            &[Argument::NewId(toplevel_id)],
        )?;
        Ok(Proxy::from_id(toplevel_id))
    }

    pub fn set_window_geometry(
        &self,
        conn: &mut Connection,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_SET_WINDOW_GEOMETRY_OPCODE,
            &[
                Argument::Int(x),
                Argument::Int(y),
                Argument::Int(width),
                Argument::Int(height),
            ],
        )
    }

    pub fn ack_configure(&self, conn: &mut Connection, serial: u32) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_ACK_CONFIGURE_OPCODE,
            &[Argument::Uint(serial)],
        )
    }

    pub fn destroy(&self, conn: &mut Connection) -> Result<()> {
        conn.send_request(self.id(), REQ_DESTROY_OPCODE, &[])
    }
}

/// The `configure` event: the serial must be echoed back via
/// `ack_configure` before the surface may present a buffer.
#[derive(Debug)]
pub struct ConfigureEvent {
    pub serial: u32,
}

impl ConfigureEvent {
    pub fn parse(mut body: &[u8]) -> Result<Self> {
        Ok(ConfigureEvent {
            serial: read_u32(&mut body)?,
        })
    }
}
