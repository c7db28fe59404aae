//! Byte sequence reversal.
//!
//! [`reverse`] is the whole library: it borrows a byte slice and hands back a
//! freshly owned `Vec<u8>` with the bytes in reverse order. The [`ffi`]
//! module exports the same operation as C symbols for native hosts.

pub mod errors;
pub mod ffi;
pub mod reverser;

pub use errors::ReverseError;
pub use reverser::reverse;
pub use reverser::reverse_str;
pub use reverser::reverse_with_headroom;
