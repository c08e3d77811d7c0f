//! Peer networking: the wire codec, packet taxonomy, join handshake, and a
//! transport abstraction that lets the real and in-memory loopback
//! implementations stand in for each other.

pub mod codec;
pub mod error;
pub mod handshake;
pub mod packet;
pub mod transport;

pub use error::{NetError, NetResult};
pub use packet::Packet;
pub use transport::{InMemoryNetworkHandle, InMemoryTransport, Transport, TransportEvent};
