//! End-to-end session flow against a scripted in-process compositor on the
//! other end of a socketpair: enumeration, binds, the window configure
//! handshake, shared-memory negotiation and the first presented frame.

use std::collections::HashMap;
use std::fs::File;
use std::io::{IoSliceMut, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::thread;

use memmap2::MmapMut;
use nix::sys::socket::{recvmsg, ControlMessageOwned, MsgFlags};

use waylite::protocols::{
    wl_callback, wl_compositor, wl_display, wl_registry, wl_shm, wl_shm_pool, wl_surface,
    xdg_surface, xdg_toplevel, xdg_wm_base,
};
use waylite::wire::{read_string, read_u32, serialize_message, Argument, MessageHeader};
use waylite::{
    Connection, GlobalSlot, Session, SessionState, WaylandClientError, WaylandSocket, WindowState,
    DEFAULT_REQUIREMENTS,
};

const WIDTH: i32 = 64;
const HEIGHT: i32 = 48;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn read_message(stream: &mut UnixStream) -> (MessageHeader, Vec<u8>) {
    let mut header_bytes = [0u8; 8];
    stream.read_exact(&mut header_bytes).unwrap();
    let header = MessageHeader::decode(&header_bytes).unwrap();
    let mut body = vec![0u8; header.size as usize - 8];
    stream.read_exact(&mut body).unwrap();
    (header, body)
}

fn send_event(stream: &mut UnixStream, object_id: u32, opcode: u16, args: &[Argument]) {
    let bytes = serialize_message(object_id, opcode, args).unwrap();
    stream.write_all(&bytes).unwrap();
}

/// Reads the `wl_shm.create_pool` request together with its `SCM_RIGHTS`
/// descriptor. This one must come through `recvmsg` so the ancillary data
/// is not discarded by a plain read.
fn read_create_pool(stream: &mut UnixStream) -> (MessageHeader, u32, i32, OwnedFd) {
    let mut buf = [0u8; 16];
    let mut iov = [IoSliceMut::new(&mut buf)];
    let mut cmsg_space = nix::cmsg_space!([RawFd; 2]);
    let mut fds = Vec::new();
    let bytes_read = {
        let msg = recvmsg::<()>(
            stream.as_raw_fd(),
            &mut iov,
            Some(&mut cmsg_space),
            MsgFlags::empty(),
        )
        .unwrap();
        for cmsg in msg.cmsgs() {
            if let ControlMessageOwned::ScmRights(received) = cmsg {
                fds.extend(received);
            }
        }
        msg.bytes
    };
    drop(iov);
    assert_eq!(bytes_read, 16, "create_pool should be a 16-byte message");
    assert_eq!(fds.len(), 1, "create_pool should carry exactly one fd");

    let header = MessageHeader::decode(&buf).unwrap();
    let mut body = &buf[8..];
    let pool_id = read_u32(&mut body).unwrap();
    let size = read_u32(&mut body).unwrap() as i32;
    let fd = unsafe { OwnedFd::from_raw_fd(fds[0]) };
    (header, pool_id, size, fd)
}

/// Plays the compositor's half of a full session: registry burst, binds,
/// configure handshake, pool negotiation, frame ack. Panics (failing the
/// test through `join`) on any request that deviates from the protocol.
fn scripted_compositor(mut stream: UnixStream) {
    // get_registry then the enumeration sync.
    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, 1);
    assert_eq!(header.opcode, wl_display::REQ_GET_REGISTRY_OPCODE);
    let registry_id = read_u32(&mut body.as_slice()).unwrap();

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, 1);
    assert_eq!(header.opcode, wl_display::REQ_SYNC_OPCODE);
    let callback_id = read_u32(&mut body.as_slice()).unwrap();

    for (name, interface, version) in [
        (1u32, "wl_shm", 1u32),
        (2, "wl_compositor", 6),
        (3, "wl_seat", 9),
        (4, "xdg_wm_base", 7),
        (5, "wl_output", 4),
    ] {
        send_event(
            &mut stream,
            registry_id,
            wl_registry::EVT_GLOBAL_OPCODE,
            &[
                Argument::Uint(name),
                Argument::Str(interface.to_owned()),
                Argument::Uint(version),
            ],
        );
    }
    send_event(
        &mut stream,
        callback_id,
        wl_callback::EVT_DONE_OPCODE,
        &[Argument::Uint(0)],
    );

    // One bind per requirement, in requirement order.
    let mut bound = HashMap::new();
    for _ in 0..DEFAULT_REQUIREMENTS.len() {
        let (header, body) = read_message(&mut stream);
        assert_eq!(header.object_id, registry_id);
        assert_eq!(header.opcode, wl_registry::REQ_BIND_OPCODE);
        let mut slice = body.as_slice();
        let _name = read_u32(&mut slice).unwrap();
        let interface = read_string(&mut slice).unwrap();
        let version = read_u32(&mut slice).unwrap();
        let new_id = read_u32(&mut slice).unwrap();
        let requirement = DEFAULT_REQUIREMENTS
            .iter()
            .find(|r| r.interface == interface)
            .unwrap_or_else(|| panic!("unexpected bind of {interface}"));
        assert_eq!(version, requirement.min_version);
        bound.insert(interface, new_id);
    }
    let compositor_id = bound["wl_compositor"];
    let wm_base_id = bound["xdg_wm_base"];
    let shm_id = bound["wl_shm"];

    // Window creation burst.
    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, compositor_id);
    assert_eq!(header.opcode, wl_compositor::REQ_CREATE_SURFACE_OPCODE);
    let surface_id = read_u32(&mut body.as_slice()).unwrap();

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, wm_base_id);
    assert_eq!(header.opcode, xdg_wm_base::REQ_GET_XDG_SURFACE_OPCODE);
    let mut slice = body.as_slice();
    let xdg_surface_id = read_u32(&mut slice).unwrap();
    assert_eq!(read_u32(&mut slice).unwrap(), surface_id);

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, xdg_surface_id);
    assert_eq!(header.opcode, xdg_surface::REQ_GET_TOPLEVEL_OPCODE);
    let toplevel_id = read_u32(&mut body.as_slice()).unwrap();

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, toplevel_id);
    assert_eq!(header.opcode, xdg_toplevel::REQ_SET_TITLE_OPCODE);
    assert_eq!(read_string(&mut body.as_slice()).unwrap(), "handshake");

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, xdg_surface_id);
    assert_eq!(header.opcode, xdg_surface::REQ_SET_WINDOW_GEOMETRY_OPCODE);
    let mut slice = body.as_slice();
    read_u32(&mut slice).unwrap();
    read_u32(&mut slice).unwrap();
    assert_eq!(read_u32(&mut slice).unwrap(), WIDTH as u32);
    assert_eq!(read_u32(&mut slice).unwrap(), HEIGHT as u32);

    let (header, _) = read_message(&mut stream);
    assert_eq!(header.object_id, surface_id);
    assert_eq!(header.opcode, wl_surface::REQ_COMMIT_OPCODE);

    send_event(
        &mut stream,
        xdg_surface_id,
        xdg_surface::EVT_CONFIGURE_OPCODE,
        &[Argument::Uint(600)],
    );

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, xdg_surface_id);
    assert_eq!(header.opcode, xdg_surface::REQ_ACK_CONFIGURE_OPCODE);
    assert_eq!(read_u32(&mut body.as_slice()).unwrap(), 600);

    // Pool negotiation. The descriptor must describe exactly the pool size
    // announced in the request, and a mapping of it must alias the
    // client's frame.
    let (header, _pool_id, size, fd) = read_create_pool(&mut stream);
    assert_eq!(header.object_id, shm_id);
    assert_eq!(header.opcode, wl_shm::REQ_CREATE_POOL_OPCODE);
    assert_eq!(size, WIDTH * 4 * HEIGHT);
    let pool_file = File::from(fd);
    assert_eq!(pool_file.metadata().unwrap().len(), size as u64);
    let mut pool_map = unsafe { MmapMut::map_mut(&pool_file).unwrap() };
    pool_map[5] = 0xCD;
    pool_map.flush().unwrap();

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.opcode, wl_shm_pool::REQ_CREATE_BUFFER_OPCODE);
    let mut slice = body.as_slice();
    let buffer_id = read_u32(&mut slice).unwrap();
    assert_eq!(read_u32(&mut slice).unwrap(), 0); // offset
    assert_eq!(read_u32(&mut slice).unwrap(), WIDTH as u32);
    assert_eq!(read_u32(&mut slice).unwrap(), HEIGHT as u32);
    assert_eq!(read_u32(&mut slice).unwrap(), (WIDTH * 4) as u32);
    assert_eq!(read_u32(&mut slice).unwrap(), wl_shm::FORMAT_XRGB8888);

    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, surface_id);
    assert_eq!(header.opcode, wl_surface::REQ_ATTACH_OPCODE);
    assert_eq!(read_u32(&mut body.as_slice()).unwrap(), buffer_id);

    let (header, _) = read_message(&mut stream);
    assert_eq!(header.opcode, wl_surface::REQ_DAMAGE_OPCODE);

    let (header, _) = read_message(&mut stream);
    assert_eq!(header.object_id, surface_id);
    assert_eq!(header.opcode, wl_surface::REQ_COMMIT_OPCODE);

    // The presentation round-trip barrier.
    let (header, body) = read_message(&mut stream);
    assert_eq!(header.object_id, 1);
    assert_eq!(header.opcode, wl_display::REQ_SYNC_OPCODE);
    let callback_id = read_u32(&mut body.as_slice()).unwrap();
    send_event(
        &mut stream,
        callback_id,
        wl_callback::EVT_DONE_OPCODE,
        &[Argument::Uint(1)],
    );

    // Teardown in reverse creation order.
    for expected in [toplevel_id, xdg_surface_id, surface_id] {
        let (header, _) = read_message(&mut stream);
        assert_eq!(header.object_id, expected);
        assert_eq!(header.opcode, 0);
    }
}

#[test]
fn full_session_reaches_presenting() {
    init_tracing();
    let (client, server) = UnixStream::pair().unwrap();
    let compositor = thread::spawn(move || scripted_compositor(server));

    let conn = Connection::from_socket(WaylandSocket::from_stream(client));
    let mut session = Session::from_connection(conn);
    assert_eq!(session.state(), SessionState::Connected);

    session.bind_globals(DEFAULT_REQUIREMENTS).unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let mut window = session.create_window("handshake", WIDTH, HEIGHT).unwrap();
    assert_eq!(session.state(), SessionState::Configured);
    assert_eq!(window.state(), WindowState::SurfaceConfigured);

    session.present(&mut window).unwrap();
    assert_eq!(session.state(), SessionState::Presenting);
    assert_eq!(window.state(), WindowState::BufferAttached);

    // The compositor scribbled into the pool before acking the round trip;
    // the same byte must be visible through the client's mapping.
    let frame = window.frame_mut().unwrap();
    assert_eq!(frame.len(), (WIDTH * 4 * HEIGHT) as usize);
    assert_eq!(frame[5], 0xCD);

    session.destroy_window(window).unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    drop(session);
    compositor.join().unwrap();
}

#[test]
fn protocol_error_during_enumeration_aborts_the_session() {
    let (client, mut server) = UnixStream::pair().unwrap();
    let conn = Connection::from_socket(WaylandSocket::from_stream(client));
    let mut session = Session::from_connection(conn);

    send_event(
        &mut server,
        1,
        wl_display::EVT_ERROR_OPCODE,
        &[
            Argument::Uint(1),
            Argument::Uint(0),
            Argument::Str("invalid object".to_owned()),
        ],
    );

    let err = session.bind_globals(DEFAULT_REQUIREMENTS).unwrap_err();
    assert!(matches!(err, WaylandClientError::Protocol { .. }));
}

#[test]
fn compositor_hangup_surfaces_as_io_error() {
    let (client, server) = UnixStream::pair().unwrap();
    let conn = Connection::from_socket(WaylandSocket::from_stream(client));
    let mut session = Session::from_connection(conn);
    drop(server);

    let err = session.bind_globals(DEFAULT_REQUIREMENTS).unwrap_err();
    assert!(matches!(err, WaylandClientError::Io(_)));
}

#[test]
fn setup_records_registry_and_callback_ids() {
    let (client, mut server) = UnixStream::pair().unwrap();
    let conn = Connection::from_socket(WaylandSocket::from_stream(client));
    let mut session = Session::from_connection(conn);

    let compositor = thread::spawn(move || {
        let (_, body) = read_message(&mut server);
        let registry_id = read_u32(&mut body.as_slice()).unwrap();
        let (_, body) = read_message(&mut server);
        let callback_id = read_u32(&mut body.as_slice()).unwrap();

        for (name, interface, version) in [
            (1u32, "wl_compositor", 6u32),
            (2, "xdg_wm_base", 6),
            (3, "wl_seat", 9),
            (4, "wl_shm", 1),
        ] {
            send_event(
                &mut server,
                registry_id,
                wl_registry::EVT_GLOBAL_OPCODE,
                &[
                    Argument::Uint(name),
                    Argument::Str(interface.to_owned()),
                    Argument::Uint(version),
                ],
            );
        }
        send_event(
            &mut server,
            callback_id,
            wl_callback::EVT_DONE_OPCODE,
            &[Argument::Uint(0)],
        );
        for _ in 0..DEFAULT_REQUIREMENTS.len() {
            read_message(&mut server);
        }
    });

    session.bind_globals(DEFAULT_REQUIREMENTS).unwrap();
    compositor.join().unwrap();

    let globals = session.connection_mut().globals();
    assert!(globals.lookup(GlobalSlot::Compositor).is_some());
    assert!(globals.lookup(GlobalSlot::Callback).is_some());
    assert!(globals.lookup(GlobalSlot::Registry).is_some());
}
