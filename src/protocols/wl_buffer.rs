//! `wl_buffer`: a chunk of a shared-memory pool the compositor can present.

use super::Interface;

#[derive(Debug)]
pub struct WlBuffer;

impl Interface for WlBuffer {
    const NAME: &'static str = "wl_buffer";
}

pub const EVT_RELEASE_OPCODE: u16 = 0;
