//! Core utilities shared by the object and index codecs
//!
//! - `codec`: SHA-1 content digests and zlib compression of object bytes

pub mod codec;
