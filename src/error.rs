use crate::objects::GlobalSlot;

/// Errors surfaced by the client. Everything except `MessageTooLarge` ends
/// the session: a corrupted stream or a missing compositor capability cannot
/// be recovered at runtime.
#[derive(Debug, thiserror::Error)]
pub enum WaylandClientError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("compositor reported error on object {object_id} (code {code}): {message}")]
    Protocol {
        object_id: u32,
        code: u32,
        message: String,
    },
    #[error("required global {0:?} was never bound")]
    UnboundGlobal(GlobalSlot),
    #[error("{interface} version {advertised} does not satisfy required minimum {required}")]
    VersionMismatch {
        interface: String,
        advertised: u32,
        required: u32,
    },
    #[error("encoded message would be {size} bytes, exceeding the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },
    #[error("malformed message: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, WaylandClientError>;
