//! # Text Encoding
//!
//! Printable forms for encryption results and digests.

use crate::error::CryptError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Output encoding for string encryptors and digesters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringOutputType {
    /// Standard alphabet with padding.
    #[default]
    Base64,
    /// Upper-case hexadecimal.
    #[serde(alias = "hex")]
    Hexadecimal,
}

impl StringOutputType {
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hexadecimal => hex::encode_upper(bytes),
        }
    }

    /// # Errors
    /// [`CryptError::OperationNotPossible`] for malformed input.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, CryptError> {
        match self {
            Self::Base64 => STANDARD.decode(text).map_err(|_| CryptError::OperationNotPossible),
            Self::Hexadecimal => hex::decode(text).map_err(|_| CryptError::OperationNotPossible),
        }
    }
}

impl FromStr for StringOutputType {
    type Err = CryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hexadecimal" | "hex" => Ok(Self::Hexadecimal),
            other => {
                Err(CryptError::initialization(format!("Unknown string output type '{other}'")))
            },
        }
    }
}

impl fmt::Display for StringOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base64 => "base64",
            Self::Hexadecimal => "hexadecimal",
        })
    }
}
