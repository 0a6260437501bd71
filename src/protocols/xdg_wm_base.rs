//! `xdg_wm_base`: entry point of the window-management extension. Also the
//! source of the compositor's `ping` liveness probe, which must be answered
//! with `pong` or the compositor may disconnect the client.

use super::wl_surface::WlSurface;
use super::xdg_surface::XdgSurface;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::{read_u32, Argument};

#[derive(Debug)]
pub struct XdgWmBase;

impl Interface for XdgWmBase {
    const NAME: &'static str = "xdg_wm_base";
}

pub const REQ_DESTROY_OPCODE: u16 = 0;
pub const REQ_GET_XDG_SURFACE_OPCODE: u16 = 2;
pub const REQ_PONG_OPCODE: u16 = 3;

pub const EVT_PING_OPCODE: u16 = 0;

impl Proxy<XdgWmBase> {
    pub fn get_xdg_surface(
        &self,
        conn: &mut Connection,
        surface: Proxy<WlSurface>,
    ) -> Result<Proxy<XdgSurface>> {
        let xdg_surface_id = conn.allocate_id();
        conn.send_request(
            self.id(),
            REQ_GET_XDG_SURFACE_OPCODE,
            &[
                Argument::NewId(xdg_surface_id),
                Argument::Object(surface.id()),
            ],
        )?;
        Ok(Proxy::from_id(xdg_surface_id))
    }

    pub fn pong(&self, conn: &mut Connection, serial: u32) -> Result<()> {
        conn.send_request(self.id(), REQ_PONG_OPCODE, &[Argument::Uint(serial)])
    }
}

#[derive(Debug)]
pub struct PingEvent {
    pub serial: u32,
}

impl PingEvent {
    pub fn parse(mut body: &[u8]) -> Result<Self> {
        Ok(PingEvent {
            serial: read_u32(&mut body)?,
        })
    }
}
