//! Error type for the networking crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("buffer too short")]
    OutOfBounds,
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,
    #[error("string exceeds maximum length")]
    StringTooLong,
    #[error("unknown packet id {0}")]
    UnknownPacket(u16),
    #[error("unknown order kind {0}")]
    UnknownOrderKind(u8),
    #[error("unknown command kind {0}")]
    UnknownCommandKind(u8),
    #[error("peer {0} is not connected")]
    PeerNotConnected(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetResult<T> = Result<T, NetError>;
