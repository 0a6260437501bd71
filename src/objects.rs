//! Object-identifier management: the client side of the id namespace shared
//! with the compositor, plus the fixed table of singleton globals.

use crate::error::{Result, WaylandClientError};

/// Identifier in the flat object namespace shared with the compositor.
pub type ObjectId = u32;

/// The null object reference.
pub const NULL_OBJECT_ID: ObjectId = 0;

/// `wl_display`, created implicitly when the connection is established.
pub const DISPLAY_OBJECT_ID: ObjectId = 1;

/// Allocates client-created object ids, starting after the reserved display
/// id. Ids are monotonic and never reused within a connection; `delete_id`
/// acknowledgements from the compositor are ignored rather than recycled.
#[derive(Debug)]
pub struct IdAllocator {
    next: ObjectId,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator {
            next: DISPLAY_OBJECT_ID + 1,
        }
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Named slots for the connection's singleton objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalSlot {
    Display,
    Registry,
    /// The one in-flight `wl_display.sync` callback.
    Callback,
    Compositor,
    Shm,
    Seat,
    XdgWmBase,
}

const GLOBAL_SLOT_COUNT: usize = 7;

const fn slot_index(slot: GlobalSlot) -> usize {
    match slot {
        GlobalSlot::Display => 0,
        GlobalSlot::Registry => 1,
        GlobalSlot::Callback => 2,
        GlobalSlot::Compositor => 3,
        GlobalSlot::Shm => 4,
        GlobalSlot::Seat => 5,
        GlobalSlot::XdgWmBase => 6,
    }
}

/// Fixed table of singleton object ids, populated incrementally during the
/// registry bind phase. Lives as long as the connection.
#[derive(Debug)]
pub struct Globals {
    slots: [ObjectId; GLOBAL_SLOT_COUNT],
}

impl Globals {
    pub fn new() -> Self {
        let mut slots = [NULL_OBJECT_ID; GLOBAL_SLOT_COUNT];
        slots[slot_index(GlobalSlot::Display)] = DISPLAY_OBJECT_ID;
        Globals { slots }
    }

    pub fn bind(&mut self, slot: GlobalSlot, id: ObjectId) {
        debug_assert_ne!(id, NULL_OBJECT_ID);
        self.slots[slot_index(slot)] = id;
    }

    /// Returns the id bound to `slot`, failing if the bind phase has not
    /// reached it yet.
    pub fn get(&self, slot: GlobalSlot) -> Result<ObjectId> {
        match self.slots[slot_index(slot)] {
            NULL_OBJECT_ID => Err(WaylandClientError::UnboundGlobal(slot)),
            id => Ok(id),
        }
    }

    /// Non-failing lookup for the event loop, which probes slots that may
    /// legitimately still be unbound.
    pub fn lookup(&self, slot: GlobalSlot) -> Option<ObjectId> {
        match self.slots[slot_index(slot)] {
            NULL_OBJECT_ID => None,
            id => Some(id),
        }
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self::new()
    }
}
