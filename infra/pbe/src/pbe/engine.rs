use crate::config::{ConfigResolver, PbeConfig, PbeParameters, PbeSettings, ResolvedPbe};
use crate::error::CryptError;
use crate::provider::{CryptoProvider, PbeCipher, ProviderSelector};
use crate::registry::Registry;
use crate::salt::{self, SaltGenerator, SaltGeneratorKind};
use crate::secret::SecretBuffer;
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Lifecycle of an engine. The only transition is `Unconfigured -> Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unconfigured,
    Initialized,
}

/// Byte-level encryption as exposed by single engines and pools alike.
pub trait ByteEncryptor: Send + Sync {
    /// # Errors
    /// See [`StandardPbeEncryptor::encrypt`].
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError>;

    /// # Errors
    /// See [`StandardPbeEncryptor::decrypt`].
    fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptError>;
}

/// Resolved, immutable state of an initialized engine.
struct PbeCore {
    params: PbeParameters,
    password: RwLock<SecretBuffer>,
    salt_generator: Arc<dyn SaltGenerator>,
    provider: Arc<dyn CryptoProvider>,
    cipher: Box<dyn PbeCipher>,
}

impl From<ResolvedPbe> for PbeCore {
    fn from(resolved: ResolvedPbe) -> Self {
        Self {
            params: resolved.params,
            password: RwLock::new(resolved.password),
            salt_generator: resolved.salt_generator,
            provider: resolved.provider,
            cipher: resolved.cipher,
        }
    }
}

impl PbeCore {
    /// Independent copy with its own cipher instance and its own copy of the password.
    fn try_clone(&self) -> Result<Self, CryptError> {
        let cipher = self
            .provider
            .cipher(&self.params.algorithm)
            .map_err(|err| CryptError::initialization(err.to_string()))?;

        Ok(Self {
            params: self.params.clone(),
            password: RwLock::new(self.password.read().clone()),
            salt_generator: Arc::clone(&self.salt_generator),
            provider: Arc::clone(&self.provider),
            cipher,
        })
    }

    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        let password = self.password.read();
        let password = password.expose()?;

        let salt = self
            .salt_generator
            .generate_salt(self.params.salt_size)
            .map_err(|_| CryptError::OperationNotPossible)?;
        let encrypted = self
            .cipher
            .encrypt(password, &salt, self.params.key_obtention_iterations, message)
            .map_err(|_| CryptError::OperationNotPossible)?;

        if self.params.embeds_salt {
            Ok(salt::embed(&salt, &encrypted, self.params.invert_salt_in_output))
        } else {
            Ok(encrypted)
        }
    }

    fn decrypt(&self, input: &[u8]) -> Result<Vec<u8>, CryptError> {
        let password = self.password.read();
        let password = password.expose()?;

        let (salt, encrypted): (Cow<'_, [u8]>, &[u8]) = if self.params.embeds_salt {
            let (salt, encrypted) =
                salt::split(input, self.params.salt_size, self.params.invert_salt_in_output)
                    .ok_or(CryptError::OperationNotPossible)?;
            (Cow::Borrowed(salt), encrypted)
        } else {
            let salt = self
                .salt_generator
                .generate_salt(self.params.salt_size)
                .map_err(|_| CryptError::OperationNotPossible)?;
            (Cow::Owned(salt), input)
        };

        self.cipher
            .decrypt(password, &salt, self.params.key_obtention_iterations, encrypted)
            .map_err(|_| CryptError::OperationNotPossible)
    }

    fn clear_password(&self) {
        self.password.write().clear();
    }
}

/// Password-based byte encryptor.
///
/// Configured through setters and/or a [`PbeConfig`] object, then initialized exactly once,
/// either explicitly via [`initialize`](Self::initialize) or implicitly by the first
/// [`encrypt`](Self::encrypt) / [`decrypt`](Self::decrypt). From then on the configuration is
/// frozen and every setter fails with [`CryptError::AlreadyInitialized`].
///
/// Output layout, with the salt only present when the salt generator embeds it:
///
/// ```text
/// [SALT(16)][CIPHERTEXT(N)][TAG(16)]          default
/// [CIPHERTEXT(N)][TAG(16)][SALT(16)]          invert_salt_in_output
/// ```
///
/// ### Example
/// ```rust
/// use pbecrypt::prelude::*;
///
/// # fn main() -> Result<(), CryptError> {
/// let encryptor = StandardPbeEncryptor::new();
/// encryptor.set_password("jasmine")?;
/// encryptor.set_key_obtention_iterations(10)?;
///
/// let encrypted = encryptor.encrypt(b"attack at dawn")?;
/// assert_eq!(encryptor.decrypt(&encrypted)?, b"attack at dawn");
/// # Ok(())
/// # }
/// ```
pub struct StandardPbeEncryptor {
    settings: Mutex<PbeSettings>,
    core: OnceLock<PbeCore>,
}

impl Default for StandardPbeEncryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardPbeEncryptor {
    #[must_use]
    pub fn new() -> Self {
        Self { settings: Mutex::new(PbeSettings::default()), core: OnceLock::new() }
    }

    /// An already initialized engine wrapping `core`.
    fn from_core(core: PbeCore) -> Self {
        Self { settings: Mutex::new(PbeSettings::default()), core: OnceLock::from(core) }
    }

    fn configure(&self, apply: impl FnOnce(&mut PbeSettings)) -> Result<(), CryptError> {
        let mut settings = self.settings.lock();
        if self.core.get().is_some() {
            return Err(CryptError::already_initialized());
        }
        apply(&mut settings);
        Ok(())
    }

    /// Attaches a configuration object, read once at initialization.
    ///
    /// # Errors
    /// [`CryptError::AlreadyInitialized`] once initialized. Same for every setter below.
    pub fn set_config(&self, config: impl PbeConfig + 'static) -> Result<(), CryptError> {
        self.configure(|s| s.config = Some(Box::new(config)))
    }

    pub fn set_algorithm(&self, algorithm: impl Into<String>) -> Result<(), CryptError> {
        self.configure(|s| s.algorithm = Some(algorithm.into()))
    }

    pub fn set_password(&self, password: impl Into<SecretBuffer>) -> Result<(), CryptError> {
        self.configure(|s| s.password = Some(password.into()))
    }

    pub fn set_key_obtention_iterations(&self, iterations: u32) -> Result<(), CryptError> {
        self.configure(|s| s.key_obtention_iterations = Some(iterations))
    }

    pub fn set_salt_generator(&self, generator: SaltGeneratorKind) -> Result<(), CryptError> {
        self.configure(|s| s.salt_generator = Some(generator))
    }

    /// Selects a provider registered under `name`.
    pub fn set_provider_name(&self, name: impl Into<String>) -> Result<(), CryptError> {
        self.configure(|s| s.provider = Some(ProviderSelector::Named(name.into())))
    }

    pub fn set_provider(&self, provider: impl CryptoProvider + 'static) -> Result<(), CryptError> {
        self.configure(|s| s.provider = Some(ProviderSelector::instance(provider)))
    }

    /// Only meaningful for pooled encryptors.
    pub fn set_pool_size(&self, pool_size: usize) -> Result<(), CryptError> {
        self.configure(|s| s.pool_size = Some(pool_size))
    }

    pub fn set_invert_salt_in_output(&self, invert: bool) -> Result<(), CryptError> {
        self.configure(|s| s.invert_salt_in_output = Some(invert))
    }

    /// Replaces the registry used to resolve provider and salt generator names.
    pub fn set_registry(&self, registry: Registry) -> Result<(), CryptError> {
        self.configure(|s| s.registry = registry)
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.core.get().is_some() { EngineState::Initialized } else { EngineState::Unconfigured }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state() == EngineState::Initialized
    }

    /// The frozen configuration, once initialized.
    #[must_use]
    pub fn parameters(&self) -> Option<&PbeParameters> {
        self.core.get().map(|core| &core.params)
    }

    /// Resolves the configuration. Idempotent; concurrent callers block until the first one
    /// finishes and then observe its result.
    ///
    /// # Errors
    /// [`CryptError::Initialization`] if the configuration cannot be resolved.
    pub fn initialize(&self) -> Result<(), CryptError> {
        self.core().map(|_| ())
    }

    fn core(&self) -> Result<&PbeCore, CryptError> {
        if let Some(core) = self.core.get() {
            return Ok(core);
        }

        let mut settings = self.settings.lock();
        if let Some(core) = self.core.get() {
            return Ok(core);
        }

        let resolved = ConfigResolver::resolve_pbe(&mut settings)?;
        debug!(
            algorithm = %resolved.params.algorithm,
            iterations = resolved.params.key_obtention_iterations,
            provider = %resolved.params.provider,
            embeds_salt = resolved.params.embeds_salt,
            "PBE encryptor initialized"
        );

        Ok(self.core.get_or_init(|| PbeCore::from(resolved)))
    }

    /// Pool size the next initialization would resolve to. Freezes nothing.
    pub(crate) fn pending_pool_size(&self) -> Option<usize> {
        self.settings.lock().pool_size()
    }

    /// Builds an initialized engine sharing this engine's resolved configuration.
    pub(crate) fn replicate(&self) -> Result<Self, CryptError> {
        self.core()?.try_clone().map(Self::from_core)
    }

    /// Encrypts `message`, initializing the engine first if needed.
    ///
    /// # Errors
    /// * [`CryptError::Initialization`] if the engine cannot be initialized.
    /// * [`CryptError::SecretAlreadyCleared`] after [`clear_password`](Self::clear_password).
    /// * [`CryptError::OperationNotPossible`] for any other failure.
    pub fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        self.core()?.encrypt(message)
    }

    /// Decrypts the output of [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    /// Same as [`encrypt`](Self::encrypt). A wrong password, a truncated input and a tampered
    /// input are all reported as [`CryptError::OperationNotPossible`].
    pub fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptError> {
        self.core()?.decrypt(encrypted)
    }

    /// Zeroizes every copy of the password this engine holds, pending or resolved.
    pub fn clear_password(&self) {
        let mut settings = self.settings.lock();
        if let Some(password) = settings.password.as_mut() {
            password.clear();
        }
        if let Some(config) = settings.config.as_deref_mut() {
            config.clear_password();
        }
        if let Some(core) = self.core.get() {
            core.clear_password();
        }
    }
}

impl ByteEncryptor for StandardPbeEncryptor {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        Self::encrypt(self, message)
    }

    fn decrypt(&self, encrypted: &[u8]) -> Result<Vec<u8>, CryptError> {
        Self::decrypt(self, encrypted)
    }
}

impl fmt::Debug for StandardPbeEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardPbeEncryptor")
            .field("state", &self.state())
            .field("parameters", &self.parameters())
            .finish_non_exhaustive()
    }
}
