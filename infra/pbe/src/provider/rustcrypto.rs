use super::algorithms;
use super::{CryptoProvider, MessageDigest, PbeCipher, ProviderError, RUST_CRYPTO};
use aead::inout::InOutBuf;
use aead::{AeadInOut, Key, KeyInit, Nonce, Tag};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use md5::Md5;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::marker::PhantomData;
use zeroize::Zeroizing;

/// Salt length for every built-in PBE algorithm.
const SALT_LEN: usize = 16;

/// AEAD key length (256-bit).
const KEY_LEN: usize = 32;

/// AEAD nonce length (96-bit).
const NONCE_LEN: usize = 12;

/// AEAD tag length (128-bit).
const TAG_LEN: usize = 16;

/// Provider backed by the RustCrypto crates.
///
/// PBE algorithms derive `KEY_LEN + NONCE_LEN` bytes with PBKDF2 and split them into the AEAD
/// key and nonce. The salt is fresh for every message under a random salt generator, so the
/// nonce never repeats for a given key. Ciphertexts are laid out as `[CIPHERTEXT(N)][TAG(16)]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

impl CryptoProvider for RustCryptoProvider {
    fn name(&self) -> &str {
        RUST_CRYPTO
    }

    fn cipher(&self, algorithm: &str) -> Result<Box<dyn PbeCipher>, ProviderError> {
        let cipher: Box<dyn PbeCipher> = match algorithm {
            a if a.eq_ignore_ascii_case(algorithms::PBE_HMAC_SHA256_AES_256_GCM) => {
                Box::new(AeadPbeCipher::<Aes256Gcm>::new(Prf::HmacSha256))
            },
            a if a.eq_ignore_ascii_case(algorithms::PBE_HMAC_SHA512_AES_256_GCM) => {
                Box::new(AeadPbeCipher::<Aes256Gcm>::new(Prf::HmacSha512))
            },
            a if a.eq_ignore_ascii_case(algorithms::PBE_HMAC_SHA256_CHACHA20_POLY1305) => {
                Box::new(AeadPbeCipher::<ChaCha20Poly1305>::new(Prf::HmacSha256))
            },
            _ => return Err(unsupported("PBE", algorithm)),
        };
        Ok(cipher)
    }

    fn digest(&self, algorithm: &str) -> Result<Box<dyn MessageDigest>, ProviderError> {
        // Accept both "SHA-256" and "SHA256" spellings.
        let normalized: String = algorithm
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let digest: Box<dyn MessageDigest> = match normalized.as_str() {
            "MD5" => Box::new(HashDigest::<Md5>::new()),
            "SHA1" => Box::new(HashDigest::<Sha1>::new()),
            "SHA256" => Box::new(HashDigest::<Sha256>::new()),
            "SHA384" => Box::new(HashDigest::<Sha384>::new()),
            "SHA512" => Box::new(HashDigest::<Sha512>::new()),
            _ => return Err(unsupported("digest", algorithm)),
        };
        Ok(digest)
    }
}

fn unsupported(kind: &'static str, algorithm: &str) -> ProviderError {
    ProviderError::UnsupportedAlgorithm {
        message: format!("Unsupported {kind} algorithm '{algorithm}'").into(),
        context: Some(RUST_CRYPTO.into()),
    }
}

fn cipher_error(message: &'static str) -> ProviderError {
    ProviderError::Cipher { message: message.into(), context: None }
}

/// Pseudo-random function used by PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prf {
    HmacSha256,
    HmacSha512,
}

struct AeadPbeCipher<C> {
    prf: Prf,
    _cipher: PhantomData<fn() -> C>,
}

impl<C> fmt::Debug for AeadPbeCipher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadPbeCipher")
            .field("prf", &self.prf)
            .field("cipher", &std::any::type_name::<C>())
            .finish()
    }
}

impl<C: AeadInOut + KeyInit> AeadPbeCipher<C> {
    const fn new(prf: Prf) -> Self {
        Self { prf, _cipher: PhantomData }
    }

    /// Runs PBKDF2 and builds the keyed cipher plus its nonce.
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<(C, Nonce<C>), ProviderError> {
        if iterations == 0 {
            return Err(cipher_error("Key derivation requires at least one iteration"));
        }

        let mut material = Zeroizing::new([0u8; KEY_LEN + NONCE_LEN]);
        match self.prf {
            Prf::HmacSha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut material[..]),
            Prf::HmacSha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut material[..]),
        }

        let (key, nonce) = material.split_at(KEY_LEN);
        let key = Key::<C>::try_from(key).map_err(|_| cipher_error("Invalid key length"))?;
        let nonce = Nonce::<C>::try_from(nonce).map_err(|_| cipher_error("Invalid nonce length"))?;

        Ok((C::new(&key), nonce))
    }
}

impl<C: AeadInOut + KeyInit> PbeCipher for AeadPbeCipher<C> {
    fn salt_size(&self) -> usize {
        SALT_LEN
    }

    fn encrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let (cipher, nonce) = self.derive(password, salt, iterations)?;

        let mut buf = Vec::with_capacity(plaintext.len() + TAG_LEN);
        buf.extend_from_slice(plaintext);

        let tag = cipher
            .encrypt_inout_detached(&nonce, &[], InOutBuf::from(&mut buf[..]))
            .map_err(|_| cipher_error("AEAD encryption failed"))?;

        buf.extend_from_slice(tag.as_slice());
        Ok(buf)
    }

    fn decrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        if ciphertext.len() < TAG_LEN {
            return Err(cipher_error("Ciphertext shorter than the authentication tag"));
        }

        let (body, tag_slice) = ciphertext.split_at(ciphertext.len() - TAG_LEN);
        let tag = Tag::<C>::try_from(tag_slice).map_err(|_| cipher_error("Invalid tag length"))?;

        let (cipher, nonce) = self.derive(password, salt, iterations)?;

        let mut buf = body.to_vec();
        cipher
            .decrypt_inout_detached(&nonce, &[], InOutBuf::from(&mut buf[..]), &tag)
            .map_err(|_| cipher_error("AEAD authentication failed"))?;

        Ok(buf)
    }
}

struct HashDigest<D> {
    _hash: PhantomData<fn() -> D>,
}

impl<D> HashDigest<D> {
    const fn new() -> Self {
        Self { _hash: PhantomData }
    }
}

impl<D> fmt::Debug for HashDigest<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashDigest").field(&std::any::type_name::<D>()).finish()
    }
}

impl<D: Digest> MessageDigest for HashDigest<D> {
    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = D::new();
        for part in parts {
            Digest::update(&mut hasher, part);
        }
        hasher.finalize().to_vec()
    }
}
