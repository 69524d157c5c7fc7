#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `pbecrypt` crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! pbecrypt-derive = { path = "../derive" }
//! ```
//!
//! The expansion refers to `::thiserror`, so consumers must depend on `thiserror` as well.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro that turns an enum into a crate error type.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` unless already derived.
/// * **Context trait**: generates `<Name>Ext` with a `context(...)` method for
///   `Result<T, Name>`, filling the `context` field of the variant that failed.
/// * **Source conversion**: variants holding a `source` field get a `From<Source>` impl and
///   a `context(...)` method on `Result<T, Source>` that wraps the source with context attached.
/// * **Helper**: a module-level `format_context` function for use inside `#[error(...)]`.
///
/// # Variant Shapes
///
/// * Named fields. A variant with a `source` must also carry
///   `context: Option<Cow<'static, str>>`.
/// * Unit variants. They carry no detail at all and are left untouched by `context(...)`,
///   which makes them suitable for deliberately opaque failures.
///
/// Tuple variants are rejected.
///
/// # Example
/// ```rust,ignore
/// use pbecrypt_derive::crypt_error;
/// use std::borrow::Cow;
///
/// #[crypt_error]
/// pub enum StoreError {
///     #[error("Random source failure{}: {source}", format_context(.context))]
///     Random { source: getrandom::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Invalid settings{}: {message}", format_context(.context))]
///     Settings { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Operation failed")]
///     Opaque,
/// }
///
/// fn salt() -> Result<[u8; 8], StoreError> {
///     let mut salt = [0u8; 8];
///     getrandom::fill(&mut salt).context("Filling salt")?;
///     Ok(salt)
/// }
/// ```
#[proc_macro_attribute]
pub fn crypt_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
