use pbecrypt_derive::crypt_error;

#[crypt_error]
pub enum TupleError {
    Random(std::io::Error),
}

fn main() {}
