//! High-level orchestration: connect, enumerate and bind the required
//! globals, run the window handshake, and present a shared-memory frame.
//! Each step checks that the prior one completed, so the strict ordering
//! the compositor expects cannot be violated from safe code.

use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::{Result, WaylandClientError};
use crate::events::{dispatch_until, next_event, roundtrip, WaitFor};
use crate::objects::GlobalSlot;
use crate::protocols::wl_buffer::WlBuffer;
use crate::protocols::wl_callback::EVT_DONE_OPCODE;
use crate::protocols::wl_compositor::WlCompositor;
use crate::protocols::wl_registry::{GlobalEvent, EVT_GLOBAL_OPCODE};
use crate::protocols::wl_shm::{WlShm, FORMAT_XRGB8888};
use crate::protocols::wl_surface::WlSurface;
use crate::protocols::xdg_surface::{ConfigureEvent, XdgSurface, EVT_CONFIGURE_OPCODE};
use crate::protocols::xdg_toplevel::XdgToplevel;
use crate::protocols::xdg_wm_base::XdgWmBase;
use crate::protocols::Proxy;
use crate::shm::SharedMemoryRegion;

/// One global the session cannot run without: the interface string the
/// registry advertises, the minimum version we speak, and the slot the
/// bound id lands in.
#[derive(Debug, Clone, Copy)]
pub struct RegistryRequirement {
    pub interface: &'static str,
    pub min_version: u32,
    pub slot: GlobalSlot,
}

/// The globals a windowed session needs.
pub const DEFAULT_REQUIREMENTS: &[RegistryRequirement] = &[
    RegistryRequirement {
        interface: "wl_compositor",
        min_version: 6,
        slot: GlobalSlot::Compositor,
    },
    RegistryRequirement {
        interface: "xdg_wm_base",
        min_version: 6,
        slot: GlobalSlot::XdgWmBase,
    },
    RegistryRequirement {
        interface: "wl_seat",
        min_version: 9,
        slot: GlobalSlot::Seat,
    },
    RegistryRequirement {
        interface: "wl_shm",
        min_version: 1,
        slot: GlobalSlot::Shm,
    },
];

/// Where the session is in its lifecycle. There is no disconnected state:
/// a `Session` only exists once the socket is connected, and dropping it
/// is the disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Enumerating,
    Ready,
    SurfaceCreated,
    Configured,
    Committed,
    Presenting,
}

/// How far a window has come through the configure handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Created,
    SurfaceConfigured,
    BufferAttached,
}

/// A top-level window: the surface, its xdg role objects, and once
/// presented, the shared-memory frame behind it.
#[derive(Debug)]
pub struct Window {
    surface: Proxy<WlSurface>,
    xdg_surface: Proxy<XdgSurface>,
    toplevel: Proxy<XdgToplevel>,
    width: i32,
    height: i32,
    state: WindowState,
    region: Option<SharedMemoryRegion>,
    buffer: Option<Proxy<WlBuffer>>,
}

impl Window {
    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The pixel storage of the presented frame, XRGB8888 rows of
    /// `width * 4` bytes. `None` until the first `present`.
    pub fn frame_mut(&mut self) -> Option<&mut [u8]> {
        self.region.as_mut().map(SharedMemoryRegion::as_mut_slice)
    }
}

#[derive(Debug)]
pub struct Session {
    conn: Connection,
    state: SessionState,
}

impl Session {
    /// Connects to the compositor named by `XDG_RUNTIME_DIR` and
    /// `WAYLAND_DISPLAY`.
    pub fn connect() -> Result<Self> {
        Ok(Self::from_connection(Connection::connect()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Session {
            conn,
            state: SessionState::Connected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Enumerates the registry and binds every requirement. Versions are
    /// checked against the advertisement before any bind goes out, so a
    /// too-old compositor fails cleanly with `VersionMismatch` instead of
    /// holding a half-bound object.
    pub fn bind_globals(&mut self, requirements: &[RegistryRequirement]) -> Result<()> {
        self.state = SessionState::Enumerating;

        let display = self.conn.display();
        let registry = display.get_registry(&mut self.conn)?;
        let callback = display.sync(&mut self.conn)?;

        // The registry replays its full burst of advertisements before the
        // sync callback fires, so `done` marks the end of enumeration.
        let mut advertised = Vec::new();
        loop {
            let msg = next_event(&mut self.conn)?;
            if msg.header.object_id == registry.id() && msg.header.opcode == EVT_GLOBAL_OPCODE {
                let event = GlobalEvent::parse(msg.args())?;
                debug!(
                    name = event.name,
                    interface = %event.interface,
                    version = event.version,
                    "global advertised"
                );
                advertised.push(event);
                continue;
            }
            if msg.header.object_id == callback.id() && msg.header.opcode == EVT_DONE_OPCODE {
                break;
            }
        }

        for requirement in requirements {
            let ad = advertised
                .iter()
                .find(|event| event.interface == requirement.interface)
                .ok_or(WaylandClientError::UnboundGlobal(requirement.slot))?;
            if ad.version < requirement.min_version {
                return Err(WaylandClientError::VersionMismatch {
                    interface: requirement.interface.to_owned(),
                    advertised: ad.version,
                    required: requirement.min_version,
                });
            }

            let new_id = self.conn.allocate_id();
            registry.bind(
                &mut self.conn,
                ad.name,
                requirement.interface,
                requirement.min_version,
                new_id,
            )?;
            self.conn.globals.bind(requirement.slot, new_id);
            info!(interface = requirement.interface, id = new_id, "bound global");
        }

        self.state = SessionState::Ready;
        Ok(())
    }

    /// Creates a titled top-level window and completes the initial
    /// configure/ack handshake. The returned window owns no buffer yet;
    /// `present` supplies one.
    pub fn create_window(&mut self, title: &str, width: i32, height: i32) -> Result<Window> {
        assert!(width > 0 && height > 0, "window must have positive extent");

        let compositor: Proxy<WlCompositor> =
            Proxy::from_id(self.conn.globals.get(GlobalSlot::Compositor)?);
        let wm_base: Proxy<XdgWmBase> =
            Proxy::from_id(self.conn.globals.get(GlobalSlot::XdgWmBase)?);

        let surface = compositor.create_surface(&mut self.conn)?;
        let xdg_surface = wm_base.get_xdg_surface(&mut self.conn, surface)?;
        let toplevel = xdg_surface.get_toplevel(&mut self.conn)?;
        toplevel.set_title(&mut self.conn, title)?;
        xdg_surface.set_window_geometry(&mut self.conn, 0, 0, width, height)?;
        self.state = SessionState::SurfaceCreated;

        // An empty commit solicits the first configure; the surface may not
        // carry a buffer until that configure has been acked.
        surface.commit(&mut self.conn)?;
        let msg = dispatch_until(
            &mut self.conn,
            WaitFor {
                object_id: xdg_surface.id(),
                opcode: EVT_CONFIGURE_OPCODE,
            },
        )?;
        let serial = ConfigureEvent::parse(msg.args())?.serial;
        xdg_surface.ack_configure(&mut self.conn, serial)?;
        self.state = SessionState::Configured;
        info!(title, width, height, "window configured");

        Ok(Window {
            surface,
            xdg_surface,
            toplevel,
            width,
            height,
            state: WindowState::SurfaceConfigured,
            region: None,
            buffer: None,
        })
    }

    /// Backs the window with a freshly negotiated shared-memory buffer and
    /// commits it. The frame starts out all zeroes (opaque black in
    /// XRGB8888); paint through `Window::frame_mut` and call `present`
    /// again to publish further frames.
    pub fn present(&mut self, window: &mut Window) -> Result<()> {
        assert_ne!(
            window.state,
            WindowState::Created,
            "window must be configured before presenting"
        );

        let stride = window.width * 4;
        let size = stride * window.height;

        if window.buffer.is_none() {
            let region = SharedMemoryRegion::allocate(size as usize)?;
            let shm: Proxy<WlShm> = Proxy::from_id(self.conn.globals.get(GlobalSlot::Shm)?);
            let pool = shm.create_pool(&mut self.conn, region.fd(), size)?;
            let buffer = pool.create_buffer(
                &mut self.conn,
                0,
                window.width,
                window.height,
                stride,
                FORMAT_XRGB8888,
            )?;
            window.region = Some(region);
            window.buffer = Some(buffer);
        }

        // Checked just above.
        let buffer = window
            .buffer
            .ok_or_else(|| WaylandClientError::Connection("buffer vanished".to_owned()))?;
        window.surface.attach(&mut self.conn, buffer, 0, 0)?;
        window
            .surface
            .damage(&mut self.conn, 0, 0, window.width, window.height)?;
        window.surface.commit(&mut self.conn)?;
        window.state = WindowState::BufferAttached;
        self.state = SessionState::Committed;

        roundtrip(&mut self.conn)?;
        self.state = SessionState::Presenting;
        debug!(width = window.width, height = window.height, "frame presented");
        Ok(())
    }

    /// Tears down the window's role objects in reverse creation order, as
    /// the protocol requires.
    pub fn destroy_window(&mut self, window: Window) -> Result<()> {
        window.toplevel.destroy(&mut self.conn)?;
        window.xdg_surface.destroy(&mut self.conn)?;
        window.surface.destroy(&mut self.conn)?;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Blocks until every request sent so far has been processed.
    pub fn roundtrip(&mut self) -> Result<()> {
        roundtrip(&mut self.conn)
    }
}
