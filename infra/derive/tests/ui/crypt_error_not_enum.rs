use pbecrypt_derive::crypt_error;

#[crypt_error]
pub struct SettingsError {
    message: String,
}

fn main() {}
