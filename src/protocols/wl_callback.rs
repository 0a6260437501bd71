//! `wl_callback`: fires a single `done` event and is then dead. Used only
//! as the sync barrier returned by `wl_display.sync`.

use super::Interface;

#[derive(Debug)]
pub struct WlCallback;

impl Interface for WlCallback {
    const NAME: &'static str = "wl_callback";
}

pub const EVT_DONE_OPCODE: u16 = 0;
