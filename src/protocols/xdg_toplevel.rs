//! `xdg_toplevel`: the top-level window role.

use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::Argument;

#[derive(Debug)]
pub struct XdgToplevel;

impl Interface for XdgToplevel {
    const NAME: &'static str = "xdg_toplevel";
}

pub const REQ_DESTROY_OPCODE: u16 = 0;
pub const REQ_SET_TITLE_OPCODE: u16 = 2;

pub const EVT_CONFIGURE_OPCODE: u16 = 0;
pub const EVT_CLOSE_OPCODE: u16 = 1;

impl Proxy<XdgToplevel> {
    /// Sets the window title. An absurdly long title fails with
    /// `MessageTooLarge` instead of being truncated on the wire.
    pub fn set_title(&self, conn: &mut Connection, title: &str) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_SET_TITLE_OPCODE,
            &[Argument::Str(title.to_owned())],
        )
    }

    pub fn destroy(&self, conn: &mut Connection) -> Result<()> {
        conn.send_request(self.id(), REQ_DESTROY_OPCODE, &[])
    }
}
