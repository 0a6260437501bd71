//! `wl_display`: the implicit root object (id 1). Source of the fatal
//! `error` event and of sync callbacks used as round-trip barriers.

use super::wl_callback::WlCallback;
use super::wl_registry::WlRegistry;
use super::{Interface, Proxy};
use crate::connection::Connection;
use crate::error::Result;
use crate::objects::GlobalSlot;
use crate::wire::{read_string, read_u32, Argument};

#[derive(Debug)]
pub struct WlDisplay;

impl Interface for WlDisplay {
    const NAME: &'static str = "wl_display";
}

pub const REQ_SYNC_OPCODE: u16 = 0;
pub const REQ_GET_REGISTRY_OPCODE: u16 = 1;

pub const EVT_ERROR_OPCODE: u16 = 0;
pub const EVT_DELETE_ID_OPCODE: u16 = 1;

impl Proxy<WlDisplay> {
    /// Requests a `done` event on a fresh callback object. The callback id
    /// is recorded as the connection's one in-flight sync barrier.
    pub fn sync(&self, conn: &mut Connection) -> Result<Proxy<WlCallback>> {
        let callback_id = conn.allocate_id();
        conn.send_request(self.id(), REQ_SYNC_OPCODE, &[Argument::NewId(callback_id)])?;
        conn.globals.bind(GlobalSlot::Callback, callback_id);
        Ok(Proxy::from_id(callback_id))
    }

    pub fn get_registry(&self, conn: &mut Connection) -> Result<Proxy<WlRegistry>> {
        let registry_id = conn.allocate_id();
        conn.send_request(
            self.id(),
            REQ_GET_REGISTRY_OPCODE,
            &[Argument::NewId(registry_id)],
        )?;
        conn.globals.bind(GlobalSlot::Registry, registry_id);
        Ok(Proxy::from_id(registry_id))
    }
}

/// The compositor's fatal `error` event.
#[derive(Debug)]
pub struct ErrorEvent {
    pub object_id: u32,
    pub code: u32,
    pub message: String,
}

impl ErrorEvent {
    pub fn parse(mut body: &[u8]) -> Result<Self> {
        let object_id = read_u32(&mut body)?;
        let code = read_u32(&mut body)?;
        let message = read_string(&mut body)?;
        Ok(ErrorEvent {
            object_id,
            code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{read_request, test_connection};
    use super::*;
    use crate::wire::Argument;

    #[test]
    fn sync_allocates_callback_and_sends_opcode_zero() {
        let (mut conn, mut peer) = test_connection();
        let display = conn.display();

        let callback = display.sync(&mut conn).unwrap();
        assert_eq!(callback.id(), 2);
        assert_eq!(conn.globals().get(GlobalSlot::Callback).unwrap(), 2);

        let (header, body) = read_request(&mut peer);
        assert_eq!(header.object_id, 1);
        assert_eq!(header.opcode, REQ_SYNC_OPCODE);
        assert_eq!(body, 2u32.to_ne_bytes());
    }

    #[test]
    fn get_registry_sends_new_id_argument() {
        let (mut conn, mut peer) = test_connection();
        let display = conn.display();

        let registry = display.get_registry(&mut conn).unwrap();
        let (header, body) = read_request(&mut peer);
        assert_eq!(header.object_id, 1);
        assert_eq!(header.opcode, REQ_GET_REGISTRY_OPCODE);
        assert_eq!(body, registry.id().to_ne_bytes());
    }

    #[test]
    fn error_event_parses_all_fields() {
        let mut body = Vec::new();
        Argument::Uint(4).encode_into(&mut body);
        Argument::Uint(1).encode_into(&mut body);
        Argument::Str("invalid method".to_owned()).encode_into(&mut body);

        let event = ErrorEvent::parse(&body).unwrap();
        assert_eq!(event.object_id, 4);
        assert_eq!(event.code, 1);
        assert_eq!(event.message, "invalid method");
    }
}
