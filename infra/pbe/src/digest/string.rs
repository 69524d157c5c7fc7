use super::engine::StandardDigester;
use crate::encoding::StringOutputType;
use crate::error::CryptError;
use std::borrow::Cow;
use subtle::ConstantTimeEq;

/// Text form of a digest: `prefix || encode(bytes) || suffix`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestFormat {
    pub output: StringOutputType,
    pub prefix: Option<Cow<'static, str>>,
    pub suffix: Option<Cow<'static, str>>,
}

impl DigestFormat {
    #[must_use]
    pub const fn new(output: StringOutputType) -> Self {
        Self { output, prefix: None, suffix: None }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    fn render(&self, bytes: &[u8]) -> String {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        let suffix = self.suffix.as_deref().unwrap_or_default();
        format!("{prefix}{}{suffix}", self.output.encode(bytes))
    }

    /// The encoded body between prefix and suffix.
    fn strip<'a>(&self, text: &'a str) -> Result<&'a str, CryptError> {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        let suffix = self.suffix.as_deref().unwrap_or_default();
        text.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .ok_or(CryptError::OperationNotPossible)
    }
}

/// Digests UTF-8 text into encoded, optionally decorated text.
///
/// Matching re-encodes the recomputed digest and compares the complete text, decoration
/// included, in constant time. A hexadecimal digest therefore only matches in upper case.
///
/// ### Example
/// RFC 2307 style `{MD5}` password hashes: no salt, a single pass, base64.
/// ```rust
/// use pbecrypt::prelude::*;
///
/// # fn main() -> Result<(), CryptError> {
/// let digester = StringDigester::new(
///     StandardDigester::new(),
///     DigestFormat::new(StringOutputType::Base64).with_prefix("{MD5}"),
/// );
/// digester.digester().set_algorithm("MD5")?;
/// digester.digester().set_iterations(1)?;
/// digester.digester().set_salt_size_bytes(0)?;
///
/// assert_eq!(digester.digest("password")?, "{MD5}X03MO1qnZdYdgyfeuILPmQ==");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StringDigester {
    digester: StandardDigester,
    format: DigestFormat,
}

impl StringDigester {
    #[must_use]
    pub const fn new(digester: StandardDigester, format: DigestFormat) -> Self {
        Self { digester, format }
    }

    /// The underlying byte digester, for configuration.
    #[must_use]
    pub const fn digester(&self) -> &StandardDigester {
        &self.digester
    }

    #[must_use]
    pub const fn format(&self) -> &DigestFormat {
        &self.format
    }

    /// # Errors
    /// See [`StandardDigester::digest`].
    pub fn digest(&self, message: &str) -> Result<String, CryptError> {
        let digest = self.digester.digest(message.as_bytes())?;
        Ok(self.format.render(&digest))
    }

    /// # Errors
    /// [`CryptError::OperationNotPossible`] if `digest` lacks the prefix or suffix, is not
    /// validly encoded, or is too short to contain the salt.
    pub fn matches(&self, message: &str, digest: &str) -> Result<bool, CryptError> {
        let body = self.format.strip(digest)?;
        let bytes = self.format.output.decode(body)?;

        let salt = self.digester.extract_salt(&bytes)?;
        let recomputed = self.digester.seal_with_salt(message.as_bytes(), &salt)?;
        let expected = self.format.render(&recomputed);

        Ok(expected.as_bytes().ct_eq(digest.as_bytes()).into())
    }
}
