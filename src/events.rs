//! Blocking receive-and-demultiplex loop. Incoming bytes are buffered per
//! connection and popped one message at a time, in order; a handful of
//! protocol-level events are handled here, everything else is surfaced to
//! the caller, who says what it is waiting for with an explicit `WaitFor`.

use bytes::Bytes;
use tracing::{error, trace};

use crate::connection::Connection;
use crate::error::{Result, WaylandClientError};
use crate::objects::{GlobalSlot, ObjectId, DISPLAY_OBJECT_ID};
use crate::protocols::wl_callback::EVT_DONE_OPCODE;
use crate::protocols::wl_display::{ErrorEvent, EVT_DELETE_ID_OPCODE, EVT_ERROR_OPCODE};
use crate::protocols::xdg_wm_base::{PingEvent, XdgWmBase, EVT_PING_OPCODE};
use crate::protocols::Proxy;
use crate::wire::{MessageHeader, HEADER_SIZE, MAX_MESSAGE_SIZE};

/// One decoded incoming message: header plus raw argument bytes.
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub header: MessageHeader,
    body: Bytes,
}

impl EventMessage {
    pub fn args(&self) -> &[u8] {
        &self.body
    }
}

/// What the caller is blocked on, matched by object id and opcode. Push
/// events from unrelated objects can legitimately interleave and must not
/// satisfy the wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitFor {
    pub object_id: ObjectId,
    pub opcode: u16,
}

impl WaitFor {
    pub fn matches(&self, header: &MessageHeader) -> bool {
        header.object_id == self.object_id && header.opcode == self.opcode
    }
}

/// Pops the next complete message off the receive buffer, reading from the
/// socket as often as needed. A message whose tail has not arrived yet
/// stays buffered until the next read completes it.
fn next_message(conn: &mut Connection) -> Result<EventMessage> {
    loop {
        if conn.rx.len() >= HEADER_SIZE {
            let header = MessageHeader::decode(&conn.rx)?;
            if conn.rx.len() >= header.size as usize {
                let mut frame = conn.rx.split_to(header.size as usize);
                let body = frame.split_off(HEADER_SIZE).freeze();
                return Ok(EventMessage { header, body });
            }
        }
        let mut buf = [0u8; MAX_MESSAGE_SIZE];
        let read = conn.socket.receive_blocking(&mut buf)?;
        conn.rx.extend_from_slice(&buf[..read]);
    }
}

/// Returns the next event after applying the fixed protocol-level handlers:
/// `wl_display.error` is fatal, `wl_display.delete_id` is ignored (ids are
/// never recycled), and `xdg_wm_base.ping` is answered with `pong` so the
/// compositor does not disconnect us as unresponsive.
pub fn next_event(conn: &mut Connection) -> Result<EventMessage> {
    loop {
        let msg = next_message(conn)?;

        if msg.header.object_id == DISPLAY_OBJECT_ID {
            match msg.header.opcode {
                EVT_ERROR_OPCODE => {
                    let event = ErrorEvent::parse(msg.args())?;
                    error!(
                        object_id = event.object_id,
                        code = event.code,
                        message = %event.message,
                        "compositor protocol error"
                    );
                    return Err(WaylandClientError::Protocol {
                        object_id: event.object_id,
                        code: event.code,
                        message: event.message,
                    });
                }
                EVT_DELETE_ID_OPCODE => {
                    trace!("ignoring wl_display.delete_id");
                    continue;
                }
                _ => {}
            }
        }

        if conn.globals.lookup(GlobalSlot::XdgWmBase) == Some(msg.header.object_id)
            && msg.header.opcode == EVT_PING_OPCODE
        {
            let serial = PingEvent::parse(msg.args())?.serial;
            trace!(serial, "answering xdg_wm_base.ping");
            let wm_base: Proxy<XdgWmBase> = Proxy::from_id(msg.header.object_id);
            wm_base.pong(conn, serial)?;
            continue;
        }

        return Ok(msg);
    }
}

/// Blocks until the awaited event arrives. Events that neither match the
/// wait nor belong to the fixed handlers are logged and dropped; this
/// minimal client keeps no queue of unsolicited events.
pub fn dispatch_until(conn: &mut Connection, wait: WaitFor) -> Result<EventMessage> {
    loop {
        let msg = next_event(conn)?;
        if wait.matches(&msg.header) {
            return Ok(msg);
        }
        trace!(
            object_id = msg.header.object_id,
            opcode = msg.header.opcode,
            "ignoring event while waiting"
        );
    }
}

/// Round-trip barrier: issues `wl_display.sync` and blocks until the
/// compositor fires `done` on the fresh callback, proving every prior
/// request has been processed.
pub fn roundtrip(conn: &mut Connection) -> Result<()> {
    let display = conn.display();
    let callback = display.sync(conn)?;
    dispatch_until(
        conn,
        WaitFor {
            object_id: callback.id(),
            opcode: EVT_DONE_OPCODE,
        },
    )?;
    Ok(())
}
