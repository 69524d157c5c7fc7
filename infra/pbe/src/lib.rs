//! Password-based encryption and salted digests with a byte-exact wire format.
//!
//! A password is stretched with PBKDF2 into a key for an authenticated cipher, or mixed with a
//! salt into an iterated one-way digest. Every engine resolves its configuration once, from
//! explicit settings, a configuration object and built-in defaults (in that order), and is
//! immutable afterwards.
//!
//! ## Wire Formats
//!
//! Encryption results, with the salt present only when the salt generator embeds it:
//!
//! ```text
//! [SALT(16)][CIPHERTEXT(N)][TAG(16)]      default
//! [CIPHERTEXT(N)][TAG(16)][SALT(16)]      invert_salt_in_output
//! ```
//!
//! Digests, optionally encoded as base64 or hexadecimal and wrapped in a prefix and suffix:
//!
//! ```text
//! [SALT(S)][DIGEST(D)]    default
//! [DIGEST(D)][SALT(S)]    invert_salt_in_output
//! ```
//!
//! Arbitrary-precision integers carry their exact byte length in a trailing tag:
//!
//! ```text
//! [PAYLOAD(N)][LEN(4)]    read as one signed big-endian integer
//! ```
//!
//! ## Salt Policy
//!
//! With the default random salt generator every encryption derives a fresh key and nonce, so
//! encrypting the same message twice yields different results. Fixed and zero salts are not
//! embedded and make encryption deterministic: equal messages produce equal ciphertexts under
//! the same password. Use them only where that is the intent.
//!
//! ## Examples
//!
//! ### Basic Usage via Prelude
//! ```rust
//! use pbecrypt::prelude::*;
//!
//! # fn main() -> Result<(), CryptError> {
//! let encryptor = PbeStringEncryptor::new(StandardPbeEncryptor::new(), StringOutputType::Base64);
//! encryptor.encryptor().set_password("master-secret")?;
//! encryptor.encryptor().set_key_obtention_iterations(100)?;
//!
//! let encrypted = encryptor.encrypt("Ada Lovelace")?;
//! assert_eq!(encryptor.decrypt(&encrypted)?, "Ada Lovelace");
//!
//! let digester = StringDigester::new(StandardDigester::new(), DigestFormat::default());
//! digester.digester().set_iterations(100)?;
//!
//! let digest = digester.digest("correct horse")?;
//! assert!(digester.matches("correct horse", &digest)?);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod digest;
pub mod encoding;
mod error;
pub mod pbe;
pub mod provider;
mod registry;
pub mod salt;
mod secret;

pub use codec::IntegerCodec;
pub use error::{CryptError, CryptErrorExt};
pub use num_bigint::BigInt;
pub use registry::{Registry, SaltGeneratorFactory};
pub use secret::SecretBuffer;

pub mod prelude {
    pub use crate::codec::IntegerCodec;
    pub use crate::config::{PbeConfig, SimpleDigesterConfig, SimplePbeConfig, DigesterConfig};
    pub use crate::digest::{DigestFormat, StandardDigester, StringDigester};
    pub use crate::encoding::StringOutputType;
    pub use crate::error::{CryptError, CryptErrorExt};
    pub use crate::pbe::{
        ByteEncryptor, EngineState, PbeBigIntEncryptor, PbeStringEncryptor, PooledPbeEncryptor,
        StandardPbeEncryptor,
    };
    pub use crate::provider::{CryptoProvider, algorithms};
    pub use crate::registry::Registry;
    pub use crate::salt::SaltGeneratorKind;
    pub use crate::secret::SecretBuffer;
}
