//! # Salt Generation
//!
//! A [`SaltGenerator`] produces the salt mixed into every key derivation or digest, and tells
//! the engine whether that salt has to travel in plain form next to the result.
//!
//! | Generator | Salt | Embedded |
//! |---|---|---|
//! | [`RandomSaltGenerator`] | OS CSPRNG | yes |
//! | [`FixedSaltGenerator`] | caller-supplied bytes | no |
//! | [`ZeroSaltGenerator`] | all zeros | no |
//!
//! Non-embedding generators must return the same salt every time, since decryption and
//! digest matching regenerate it instead of reading it from the input.

use crate::provider::{ProviderError, ProviderErrorExt};
use std::fmt;
use std::sync::Arc;

pub trait SaltGenerator: Send + Sync + fmt::Debug {
    /// Produces a salt of exactly `len` bytes.
    ///
    /// # Errors
    /// [`ProviderError`] if the salt cannot be produced.
    fn generate_salt(&self, len: usize) -> Result<Vec<u8>, ProviderError>;

    /// Whether the salt must be embedded unencrypted in results.
    fn includes_plain_salt(&self) -> bool;
}

/// Cryptographically strong random salts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSaltGenerator;

impl SaltGenerator for RandomSaltGenerator {
    fn generate_salt(&self, len: usize) -> Result<Vec<u8>, ProviderError> {
        let mut salt = vec![0u8; len];
        getrandom::fill(&mut salt).context("System RNG unavailable for salt generation")?;
        Ok(salt)
    }

    fn includes_plain_salt(&self) -> bool {
        true
    }
}

/// A caller-supplied salt, truncated to the requested length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSaltGenerator {
    salt: Vec<u8>,
}

impl FixedSaltGenerator {
    #[must_use]
    pub fn new(salt: impl Into<Vec<u8>>) -> Self {
        Self { salt: salt.into() }
    }
}

impl SaltGenerator for FixedSaltGenerator {
    fn generate_salt(&self, len: usize) -> Result<Vec<u8>, ProviderError> {
        self.salt.get(..len).map(<[u8]>::to_vec).ok_or_else(|| ProviderError::Salt {
            message: format!(
                "Requested salt of {len} bytes, but only {} fixed bytes are configured",
                self.salt.len()
            )
            .into(),
            context: None,
        })
    }

    fn includes_plain_salt(&self) -> bool {
        false
    }
}

/// An all-zero salt of the requested length.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroSaltGenerator;

impl SaltGenerator for ZeroSaltGenerator {
    fn generate_salt(&self, len: usize) -> Result<Vec<u8>, ProviderError> {
        Ok(vec![0u8; len])
    }

    fn includes_plain_salt(&self) -> bool {
        false
    }
}

/// Salt generator selection as stored in a configuration.
///
/// `Named` is looked up in the engine's [`Registry`](crate::Registry) when the configuration is
/// resolved; the other variants are used as-is.
#[derive(Clone, Debug, Default)]
pub enum SaltGeneratorKind {
    #[default]
    Random,
    Zero,
    Fixed(Vec<u8>),
    Named(String),
    Custom(Arc<dyn SaltGenerator>),
}

impl SaltGeneratorKind {
    #[must_use]
    pub fn custom(generator: impl SaltGenerator + 'static) -> Self {
        Self::Custom(Arc::new(generator))
    }
}

/// Appends `salt` and `payload` in output order: `[salt][payload]`, or `[payload][salt]`
/// when `invert` is set.
pub(crate) fn embed(salt: &[u8], payload: &[u8], invert: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(salt.len() + payload.len());
    if invert {
        out.extend_from_slice(payload);
        out.extend_from_slice(salt);
    } else {
        out.extend_from_slice(salt);
        out.extend_from_slice(payload);
    }
    out
}

/// Inverse of [`embed`]: returns `(salt, payload)`, or `None` if `input` is shorter than the
/// salt.
pub(crate) fn split(input: &[u8], salt_len: usize, invert: bool) -> Option<(&[u8], &[u8])> {
    if input.len() < salt_len {
        return None;
    }
    if invert {
        let (payload, salt) = input.split_at(input.len() - salt_len);
        Some((salt, payload))
    } else {
        Some(input.split_at(salt_len))
    }
}
