use parking_lot::Mutex;
use pbecrypt::prelude::*;
use pbecrypt::provider::{MessageDigest, PbeCipher, ProviderError, RustCryptoProvider};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PASSWORD: &str = "master-secret-123";

/// Low enough to keep PBKDF2 cheap in tests.
pub const TEST_ITERATIONS: u32 = 10;

/// Creates an encryptor with the test password and iteration count.
/// # Panics
/// * If a setter fails, the function will panic.
#[must_use]
pub fn setup_encryptor() -> StandardPbeEncryptor {
    let encryptor = StandardPbeEncryptor::new();
    encryptor.set_password(PASSWORD).expect("password rejected");
    encryptor.set_key_obtention_iterations(TEST_ITERATIONS).expect("iterations rejected");
    encryptor
}

/// Creates a pool of `size` slots with the test password and iteration count.
/// # Panics
/// * If pool setup fails, the function will panic.
#[must_use]
pub fn setup_pool(size: usize) -> PooledPbeEncryptor {
    let pool = PooledPbeEncryptor::with_pool_size(size).expect("pool setup failed");
    pool.set_password(PASSWORD).expect("password rejected");
    pool.set_key_obtention_iterations(TEST_ITERATIONS).expect("iterations rejected");
    pool
}

/// Provider that numbers its ciphers in creation order and logs which one did each encryption.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    created: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<usize>>>,
}

impl RecordingProvider {
    #[must_use]
    pub fn ciphers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Cipher ids in the order they encrypted.
    #[must_use]
    pub fn encryptions(&self) -> Vec<usize> {
        self.log.lock().clone()
    }
}

impl CryptoProvider for RecordingProvider {
    fn name(&self) -> &str {
        "Recording"
    }

    fn cipher(&self, algorithm: &str) -> Result<Box<dyn PbeCipher>, ProviderError> {
        let inner = RustCryptoProvider.cipher(algorithm)?;
        let id = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingCipher { id, inner, log: Arc::clone(&self.log) }))
    }

    fn digest(&self, algorithm: &str) -> Result<Box<dyn MessageDigest>, ProviderError> {
        RustCryptoProvider.digest(algorithm)
    }
}

#[derive(Debug)]
struct RecordingCipher {
    id: usize,
    inner: Box<dyn PbeCipher>,
    log: Arc<Mutex<Vec<usize>>>,
}

impl PbeCipher for RecordingCipher {
    fn salt_size(&self) -> usize {
        self.inner.salt_size()
    }

    fn encrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        self.log.lock().push(self.id);
        self.inner.encrypt(password, salt, iterations, plaintext)
    }

    fn decrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        self.inner.decrypt(password, salt, iterations, ciphertext)
    }
}
