//! `wl_compositor`: factory for surfaces.

use super::wl_surface::WlSurface;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::Argument;

#[derive(Debug)]
pub struct WlCompositor;

impl Interface for WlCompositor {
    const NAME: &'static str = "wl_compositor";
}

pub const REQ_CREATE_SURFACE_OPCODE: u16 = 0;

impl Proxy<WlCompositor> {
    pub fn create_surface(&self, conn: &mut Connection) -> Result<Proxy<WlSurface>> {
        let surface_id = conn.allocate_id();
        conn.send_request(
            self.id(),
            REQ_CREATE_SURFACE_OPCODE,
            &[Argument::NewId(surface_id)],
        )?;
        Ok(Proxy::from_id(surface_id))
    }
}
