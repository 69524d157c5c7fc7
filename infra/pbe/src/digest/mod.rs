//! # Digests
//!
//! [`StandardDigester`] produces salted, iterated digests over bytes; [`StringDigester`] wraps
//! it for UTF-8 messages with encoded, optionally decorated text output.

mod engine;
mod string;

pub use engine::StandardDigester;
pub use string::{DigestFormat, StringDigester};
