//! A minimal Wayland client speaking the raw wire protocol: no scanner,
//! no generated bindings, just the handful of interfaces needed to put a
//! shared-memory-backed top-level window on screen.
//!
//! The layers, bottom up:
//! - [`socket`]: blocking Unix-socket transport, including `SCM_RIGHTS`
//!   descriptor passing.
//! - [`wire`]: message framing and argument marshalling.
//! - [`objects`]: the id namespace and the bound-globals table.
//! - [`protocols`]: typed proxies for the core and xdg-shell interfaces.
//! - [`events`]: the blocking receive loop and round-trip barrier.
//! - [`shm`]: memfd-backed buffers shared with the compositor.
//! - [`session`]: the orchestrated connect/bind/window/present flow.

pub mod connection;
pub mod error;
pub mod events;
pub mod objects;
pub mod protocols;
pub mod session;
pub mod shm;
pub mod socket;
pub mod wire;

pub use connection::Connection;
pub use error::{Result, WaylandClientError};
pub use events::{dispatch_until, next_event, roundtrip, EventMessage, WaitFor};
pub use objects::{GlobalSlot, ObjectId};
pub use protocols::Proxy;
pub use session::{
    RegistryRequirement, Session, SessionState, Window, WindowState, DEFAULT_REQUIREMENTS,
};
pub use shm::SharedMemoryRegion;
pub use socket::WaylandSocket;
