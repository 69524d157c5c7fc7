use super::engine::{ByteEncryptor, EngineState, StandardPbeEncryptor};
use crate::config::{PbeConfig, PbeParameters};
use crate::error::CryptError;
use crate::provider::CryptoProvider;
use crate::registry::Registry;
use crate::salt::SaltGeneratorKind;
use crate::secret::SecretBuffer;
use parking_lot::Mutex;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Round-robin pool of independently initialized [`StandardPbeEncryptor`]s.
///
/// Configuration goes to the first slot. On initialization that slot resolves the
/// configuration and the remaining slots are built from its resolved state, each with its own
/// cipher instance and its own copy of the password. Operations rotate over the slots in order.
///
/// The pool size must be set, either with [`with_pool_size`](Self::with_pool_size) /
/// [`set_pool_size`](Self::set_pool_size) or through the configuration object.
pub struct PooledPbeEncryptor {
    template: StandardPbeEncryptor,
    replicas: OnceLock<Box<[StandardPbeEncryptor]>>,
    init_lock: Mutex<()>,
    cursor: AtomicUsize,
}

impl Default for PooledPbeEncryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl PooledPbeEncryptor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            template: StandardPbeEncryptor::new(),
            replicas: OnceLock::new(),
            init_lock: Mutex::new(()),
            cursor: AtomicUsize::new(0),
        }
    }

    /// # Errors
    /// [`CryptError::Initialization`] if `pool_size` is zero.
    pub fn with_pool_size(pool_size: usize) -> Result<Self, CryptError> {
        if pool_size == 0 {
            return Err(CryptError::initialization("Pool size must be positive"));
        }
        let pool = Self::new();
        pool.template.set_pool_size(pool_size)?;
        Ok(pool)
    }

    /// # Errors
    /// [`CryptError::AlreadyInitialized`] once initialized. Same for every setter below.
    pub fn set_config(&self, config: impl PbeConfig + 'static) -> Result<(), CryptError> {
        self.template.set_config(config)
    }

    pub fn set_algorithm(&self, algorithm: impl Into<String>) -> Result<(), CryptError> {
        self.template.set_algorithm(algorithm)
    }

    pub fn set_password(&self, password: impl Into<SecretBuffer>) -> Result<(), CryptError> {
        self.template.set_password(password)
    }

    pub fn set_key_obtention_iterations(&self, iterations: u32) -> Result<(), CryptError> {
        self.template.set_key_obtention_iterations(iterations)
    }

    pub fn set_salt_generator(&self, generator: SaltGeneratorKind) -> Result<(), CryptError> {
        self.template.set_salt_generator(generator)
    }

    pub fn set_provider_name(&self, name: impl Into<String>) -> Result<(), CryptError> {
        self.template.set_provider_name(name)
    }

    pub fn set_provider(&self, provider: impl CryptoProvider + 'static) -> Result<(), CryptError> {
        self.template.set_provider(provider)
    }

    pub fn set_pool_size(&self, pool_size: usize) -> Result<(), CryptError> {
        self.template.set_pool_size(pool_size)
    }

    pub fn set_invert_salt_in_output(&self, invert: bool) -> Result<(), CryptError> {
        self.template.set_invert_salt_in_output(invert)
    }

    pub fn set_registry(&self, registry: Registry) -> Result<(), CryptError> {
        self.template.set_registry(registry)
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.replicas.get().is_some() {
            EngineState::Initialized
        } else {
            EngineState::Unconfigured
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state() == EngineState::Initialized
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&PbeParameters> {
        self.replicas.get().and_then(|_| self.template.parameters())
    }

    /// Number of slots, once initialized.
    #[must_use]
    pub fn pool_size(&self) -> Option<usize> {
        self.replicas.get().map(|replicas| replicas.len() + 1)
    }

    /// Initializes every slot. Idempotent.
    ///
    /// # Errors
    /// [`CryptError::Initialization`] if the configuration cannot be resolved or no pool size
    /// was given.
    pub fn initialize(&self) -> Result<(), CryptError> {
        self.replicas().map(|_| ())
    }

    fn replicas(&self) -> Result<&[StandardPbeEncryptor], CryptError> {
        if let Some(replicas) = self.replicas.get() {
            return Ok(&replicas[..]);
        }

        let _guard = self.init_lock.lock();
        if let Some(replicas) = self.replicas.get() {
            return Ok(&replicas[..]);
        }

        // Slot 0 freezes on initialization, so a missing size must fail before that.
        if !self.template.is_initialized() {
            match self.template.pending_pool_size() {
                None => return Err(missing_pool_size()),
                Some(0) => return Err(CryptError::initialization("Pool size must be positive")),
                Some(_) => {},
            }
        }

        self.template.initialize()?;
        let pool_size = self
            .template
            .parameters()
            .and_then(|params| params.pool_size)
            .ok_or_else(missing_pool_size)?;

        let built = (1..pool_size)
            .map(|_| self.template.replicate())
            .collect::<Result<Box<[_]>, _>>()?;

        debug!(pool_size, "PBE encryptor pool initialized");
        Ok(&self.replicas.get_or_init(|| built)[..])
    }

    /// Picks the next slot in round-robin order.
    fn next(&self) -> Result<&StandardPbeEncryptor, CryptError> {
        let replicas = self.replicas()?;
        let size = replicas.len() + 1;

        let index = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some((current + 1) % size)
            })
            .unwrap_or_default();
        trace!(slot = index, "PBE pool slot selected");

        Ok(match index {
            0 => &self.template,
            n => &replicas[n - 1],
        })
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::encrypt`].
    pub fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        self.next()?.encrypt(message)
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::decrypt`].
    pub fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptError> {
        self.next()?.decrypt(encrypted)
    }

    /// Zeroizes the password in every slot.
    pub fn clear_password(&self) {
        self.template.clear_password();
        if let Some(replicas) = self.replicas.get() {
            for replica in replicas.iter() {
                replica.clear_password();
            }
        }
    }
}

fn missing_pool_size() -> CryptError {
    CryptError::initialization("Pool size must be set for pooled encryptors")
}

impl ByteEncryptor for PooledPbeEncryptor {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        Self::encrypt(self, message)
    }

    fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptError> {
        Self::decrypt(self, encrypted)
    }
}

impl fmt::Debug for PooledPbeEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledPbeEncryptor")
            .field("state", &self.state())
            .field("pool_size", &self.pool_size())
            .field("parameters", &self.parameters())
            .finish_non_exhaustive()
    }
}
