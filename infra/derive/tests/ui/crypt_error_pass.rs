use pbecrypt_derive::crypt_error;
use std::borrow::Cow;

#[crypt_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Settings error{}: {message}", format_context(.context))]
    Settings { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    let failed: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    failed.context("reading settings")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading settings): disk");

    let settings: Result<(), DemoError> =
        Err(DemoError::Settings { message: "bad".into(), context: None });
    let err = settings.context("loading").unwrap_err();
    assert_eq!(err.to_string(), "Settings error (loading): bad");
}
