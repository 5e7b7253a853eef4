//! Wire-level building blocks: length-prefix codec, reply classification,
//! and word composition. Nothing in this module touches I/O; see
//! [`crate::transport`] and [`crate::framing`] for that.

pub mod codec;
pub mod reply;
pub mod word;

pub use codec::Encoding;
pub use reply::ReplyKind;
