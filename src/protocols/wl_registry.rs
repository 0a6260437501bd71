//! `wl_registry`: enumeration and binding of the compositor's globals.

use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::objects::ObjectId;
use crate::wire::{read_string, read_u32, Argument};

#[derive(Debug)]
pub struct WlRegistry;

impl Interface for WlRegistry {
    const NAME: &'static str = "wl_registry";
}

pub const REQ_BIND_OPCODE: u16 = 0;

pub const EVT_GLOBAL_OPCODE: u16 = 0;
pub const EVT_GLOBAL_REMOVE_OPCODE: u16 = 1;

impl Proxy<WlRegistry> {
    /// Binds the advertised global `name` to the client-chosen `new_id`.
    /// The interface string and version travel with the new id, so the
    /// compositor knows what the id will speak.
    pub fn bind(
        &self,
        conn: &mut Connection,
        name: u32,
        interface: &str,
        version: u32,
        new_id: ObjectId,
    ) -> Result<()> {
        conn.send_request(
            self.id(),
            REQ_BIND_OPCODE,
            &[
                Argument::Uint(name),
                Argument::Str(interface.to_owned()),
                Argument::Uint(version),
                Argument::NewId(new_id),
            ],
        )
    }
}

/// One `global` advertisement from the registry burst.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEvent {
    pub name: u32,
    pub interface: String,
    pub version: u32,
}

impl GlobalEvent {
    pub fn parse(mut body: &[u8]) -> Result<Self> {
        let name = read_u32(&mut body)?;
        let interface = read_string(&mut body)?;
        let version = read_u32(&mut body)?;
        Ok(GlobalEvent {
            name,
            interface,
            version,
        })
    }
}
