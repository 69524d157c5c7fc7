//! # Password-Based Encryption
//!
//! [`StandardPbeEncryptor`] is the byte-level engine, [`PooledPbeEncryptor`] spreads work over
//! several of them. [`PbeStringEncryptor`] and [`PbeBigIntEncryptor`] adapt either one to text
//! and arbitrary-precision integer payloads.

mod bigint;
mod engine;
mod pool;
mod string;

pub use bigint::PbeBigIntEncryptor;
pub use engine::{ByteEncryptor, EngineState, StandardPbeEncryptor};
pub use pool::PooledPbeEncryptor;
pub use string::PbeStringEncryptor;
