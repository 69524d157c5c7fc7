use pbecrypt_derive::crypt_error;

#[crypt_error]
pub enum SourceError {
    Random { source: std::io::Error },
}

fn main() {}
