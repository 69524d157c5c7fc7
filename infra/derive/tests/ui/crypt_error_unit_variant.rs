use pbecrypt_derive::crypt_error;
use std::borrow::Cow;

#[crypt_error]
pub enum OpaqueError {
    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Operation not possible")]
    NotPossible,
}

fn main() {
    let opaque: Result<(), OpaqueError> = Err(OpaqueError::NotPossible);
    let err = opaque.context("ignored for unit variants").unwrap_err();
    assert_eq!(err.to_string(), "Operation not possible");
}
