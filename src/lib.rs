#![warn(missing_docs)]
//! # routeros-api
//!
//! A synchronous, blocking Rust client for the MikroTik RouterOS API
//! protocol.
//!
//! ## Features
//! - Blocking, sequential command execution over a single TCP connection
//! - Both post-v6.43 plaintext and pre-v6.43 MD5 challenge login
//! - A small query builder for `print`-style predicate filtering
//!
//! ## Example
//!
//! ```rust,no_run
//! use routeros_api::login;
//!
//! # fn main() -> routeros_api::Result<()> {
//! let mut session = login("admin", "password", "192.168.88.1", routeros_api::DEFAULT_PORT, false)?;
//! let rows = session.call_positional("/interface/print", &[])?;
//! for row in rows {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Usage notes
//!
//! A [`Session`] is not safe to share across threads for concurrent calls:
//! every command is a full round trip (write the sentence, block until
//! `!done`), and `&mut self` on every operation makes that exclusivity a
//! compile-time property rather than a runtime convention.

pub mod error;
mod framing;
mod login;
pub mod protocol;
mod query;
mod session;
mod transport;

pub use error::{ConnectionError, Error, FatalError, Result, TrapError};
pub use login::{login, DEFAULT_PORT};
pub use protocol::{Encoding, ReplyKind};
pub use query::Query;
pub use session::{AttributeMap, Session};
pub use transport::{TcpTransport, Transport};
