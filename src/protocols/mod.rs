//! Typed proxies for the remote protocol objects. Every request method is a
//! pure encode-and-send: build the argument payload, prepend the header,
//! hand the bytes to the transport. Replies, where the protocol has them,
//! are collected separately through the event loop.

pub mod wl_buffer;
pub mod wl_callback;
pub mod wl_compositor;
pub mod wl_display;
pub mod wl_registry;
pub mod wl_shm;
pub mod wl_shm_pool;
pub mod wl_surface;
pub mod xdg_surface;
pub mod xdg_toplevel;
pub mod xdg_wm_base;

use std::marker::PhantomData;

use crate::objects::ObjectId;

/// A remote interface the compositor implements.
pub trait Interface {
    const NAME: &'static str;
}

/// A typed handle to one remote object: just its id plus a zero-sized
/// interface tag, so `Proxy<WlSurface>` and `Proxy<XdgToplevel>` cannot be
/// confused at compile time.
pub struct Proxy<I: Interface> {
    id: ObjectId,
    _interface: PhantomData<I>,
}

impl<I: Interface> Proxy<I> {
    pub(crate) fn from_id(id: ObjectId) -> Self {
        Proxy {
            id,
            _interface: PhantomData,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl<I: Interface> Clone for Proxy<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: Interface> Copy for Proxy<I> {}

impl<I: Interface> std::fmt::Debug for Proxy<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", I::NAME, self.id)
    }
}
