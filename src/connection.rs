//! The per-connection protocol state: the socket, the id allocator, the
//! bound-globals table and the receive buffer. One `Connection` value is
//! exclusively owned by whichever thread drives the protocol; nothing in it
//! is synchronized.

use bytes::BytesMut;
use std::os::fd::BorrowedFd;
use tracing::debug;

use crate::error::Result;
use crate::objects::{Globals, IdAllocator, ObjectId};
use crate::protocols::wl_display::WlDisplay;
use crate::protocols::Proxy;
use crate::socket::WaylandSocket;
use crate::wire::{serialize_message, Argument, MAX_MESSAGE_SIZE};

#[derive(Debug)]
pub struct Connection {
    pub(crate) socket: WaylandSocket,
    pub(crate) ids: IdAllocator,
    pub(crate) globals: Globals,
    /// Incoming bytes not yet consumed as complete messages. A message may
    /// straddle two reads; its tail stays here until the rest arrives.
    pub(crate) rx: BytesMut,
}

impl Connection {
    /// Connects to the compositor named by the environment.
    pub fn connect() -> Result<Self> {
        Ok(Self::from_socket(WaylandSocket::connect()?))
    }

    /// Builds a connection over an existing transport. The display object
    /// (id 1) exists implicitly on both sides from this point on.
    pub fn from_socket(socket: WaylandSocket) -> Self {
        Connection {
            socket,
            ids: IdAllocator::new(),
            globals: Globals::new(),
            rx: BytesMut::with_capacity(MAX_MESSAGE_SIZE),
        }
    }

    pub fn display(&self) -> Proxy<WlDisplay> {
        Proxy::from_id(crate::objects::DISPLAY_OBJECT_ID)
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub(crate) fn allocate_id(&mut self) -> ObjectId {
        self.ids.allocate()
    }

    /// Encodes and writes one request. Never blocks waiting for a reply.
    pub(crate) fn send_request(
        &mut self,
        object_id: ObjectId,
        opcode: u16,
        args: &[Argument],
    ) -> Result<()> {
        let bytes = serialize_message(object_id, opcode, args)?;
        debug!(object_id, opcode, len = bytes.len(), "request");
        self.socket.send(&bytes)?;
        Ok(())
    }

    /// Like `send_request`, with `fd` attached as ancillary data in the same
    /// transmission.
    pub(crate) fn send_request_with_fd(
        &mut self,
        object_id: ObjectId,
        opcode: u16,
        args: &[Argument],
        fd: BorrowedFd<'_>,
    ) -> Result<()> {
        let bytes = serialize_message(object_id, opcode, args)?;
        debug!(object_id, opcode, len = bytes.len(), "request with descriptor");
        self.socket.send_with_fd(&bytes, fd)?;
        Ok(())
    }
}
