use crate::config::{
    ConfigResolver, DigestParameters, DigestSettings, DigesterConfig, ResolvedDigest,
};
use crate::error::CryptError;
use crate::pbe::EngineState;
use crate::provider::{CryptoProvider, MessageDigest, ProviderSelector};
use crate::registry::Registry;
use crate::salt::{self, SaltGenerator, SaltGeneratorKind};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use subtle::ConstantTimeEq;
use tracing::debug;

struct DigestCore {
    params: DigestParameters,
    salt_generator: Arc<dyn SaltGenerator>,
    digest: Box<dyn MessageDigest>,
}

impl From<ResolvedDigest> for DigestCore {
    fn from(resolved: ResolvedDigest) -> Self {
        Self {
            params: resolved.params,
            salt_generator: resolved.salt_generator,
            digest: resolved.digest,
        }
    }
}

impl DigestCore {
    fn fresh_salt(&self) -> Result<Vec<u8>, CryptError> {
        if self.params.salt_size == 0 {
            return Ok(Vec::new());
        }
        self.salt_generator
            .generate_salt(self.params.salt_size)
            .map_err(|_| CryptError::OperationNotPossible)
    }

    /// `H(salt || message)` (or `H(message || salt)`), then re-hashed until `iterations`
    /// passes have been made.
    fn hash(&self, message: &[u8], salt: &[u8]) -> Vec<u8> {
        let parts: [&[u8]; 2] =
            if self.params.invert_salt_position { [message, salt] } else { [salt, message] };

        let mut out = self.digest.digest(&parts);
        for _ in 1..self.params.iterations {
            out = self.digest.digest(&[out.as_slice()]);
        }
        out
    }

    fn seal_with_salt(&self, message: &[u8], salt: &[u8]) -> Vec<u8> {
        let hash = self.hash(message, salt);
        if self.params.embeds_salt {
            salt::embed(salt, &hash, self.params.invert_salt_in_output)
        } else {
            hash
        }
    }

    fn extract_salt(&self, digest: &[u8]) -> Result<Vec<u8>, CryptError> {
        if self.params.embeds_salt {
            salt::split(digest, self.params.salt_size, self.params.invert_salt_in_output)
                .map(|(salt, _)| salt.to_vec())
                .ok_or(CryptError::OperationNotPossible)
        } else {
            self.fresh_salt()
        }
    }
}

/// Salted, iterated one-way digester.
///
/// Follows the same lifecycle as [`StandardPbeEncryptor`](crate::pbe::StandardPbeEncryptor):
/// configure, initialize once (explicitly or on first use), then operate on a frozen
/// configuration.
///
/// ```text
/// [SALT(S)][DIGEST(D)]    default
/// [DIGEST(D)][SALT(S)]    invert_salt_in_output
/// [DIGEST(D)]             salt generator that does not embed, or S = 0
/// ```
pub struct StandardDigester {
    settings: Mutex<DigestSettings>,
    core: OnceLock<DigestCore>,
}

impl Default for StandardDigester {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardDigester {
    #[must_use]
    pub fn new() -> Self {
        Self { settings: Mutex::new(DigestSettings::default()), core: OnceLock::new() }
    }

    fn configure(&self, apply: impl FnOnce(&mut DigestSettings)) -> Result<(), CryptError> {
        let mut settings = self.settings.lock();
        if self.core.get().is_some() {
            return Err(CryptError::already_initialized());
        }
        apply(&mut settings);
        Ok(())
    }

    /// # Errors
    /// [`CryptError::AlreadyInitialized`] once initialized. Same for every setter below.
    pub fn set_config(&self, config: impl DigesterConfig + 'static) -> Result<(), CryptError> {
        self.configure(|s| s.config = Some(Box::new(config)))
    }

    pub fn set_algorithm(&self, algorithm: impl Into<String>) -> Result<(), CryptError> {
        self.configure(|s| s.algorithm = Some(algorithm.into()))
    }

    /// Total number of hash passes; `0` and `1` both mean a single pass.
    pub fn set_iterations(&self, iterations: u32) -> Result<(), CryptError> {
        self.configure(|s| s.iterations = Some(iterations))
    }

    pub fn set_salt_size_bytes(&self, salt_size: usize) -> Result<(), CryptError> {
        self.configure(|s| s.salt_size_bytes = Some(salt_size))
    }

    pub fn set_salt_generator(&self, generator: SaltGeneratorKind) -> Result<(), CryptError> {
        self.configure(|s| s.salt_generator = Some(generator))
    }

    pub fn set_provider_name(&self, name: impl Into<String>) -> Result<(), CryptError> {
        self.configure(|s| s.provider = Some(ProviderSelector::Named(name.into())))
    }

    pub fn set_provider(&self, provider: impl CryptoProvider + 'static) -> Result<(), CryptError> {
        self.configure(|s| s.provider = Some(ProviderSelector::instance(provider)))
    }

    pub fn set_invert_salt_position(&self, invert: bool) -> Result<(), CryptError> {
        self.configure(|s| s.invert_salt_position = Some(invert))
    }

    pub fn set_invert_salt_in_output(&self, invert: bool) -> Result<(), CryptError> {
        self.configure(|s| s.invert_salt_in_output = Some(invert))
    }

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

    #[must_use]
    pub fn parameters(&self) -> Option<&DigestParameters> {
        self.core.get().map(|core| &core.params)
    }

    /// # Errors
    /// [`CryptError::Initialization`] if the configuration cannot be resolved.
    pub fn initialize(&self) -> Result<(), CryptError> {
        self.core().map(|_| ())
    }

    fn core(&self) -> Result<&DigestCore, CryptError> {
        if let Some(core) = self.core.get() {
            return Ok(core);
        }

        let settings = self.settings.lock();
        if let Some(core) = self.core.get() {
            return Ok(core);
        }

        let resolved = ConfigResolver::resolve_digest(&settings)?;
        debug!(
            algorithm = %resolved.params.algorithm,
            iterations = resolved.params.iterations,
            salt_size = resolved.params.salt_size,
            embeds_salt = resolved.params.embeds_salt,
            "Digester initialized"
        );

        Ok(self.core.get_or_init(|| DigestCore::from(resolved)))
    }

    /// Digests `message` with a fresh salt.
    ///
    /// # Errors
    /// * [`CryptError::Initialization`] if the engine cannot be initialized.
    /// * [`CryptError::OperationNotPossible`] if no salt can be generated.
    pub fn digest(&self, message: &[u8]) -> Result<Vec<u8>, CryptError> {
        let core = self.core()?;
        let salt = core.fresh_salt()?;
        Ok(core.seal_with_salt(message, &salt))
    }

    /// Checks whether `digest` was produced from `message` by an identically configured
    /// digester. The comparison runs in constant time.
    ///
    /// # Errors
    /// [`CryptError::OperationNotPossible`] if `digest` is too short to contain the salt.
    pub fn matches(&self, message: &[u8], digest: &[u8]) -> Result<bool, CryptError> {
        let core = self.core()?;
        let salt = core.extract_salt(digest)?;
        let expected = core.seal_with_salt(message, &salt);
        Ok(expected.as_slice().ct_eq(digest).into())
    }

    /// Salt embedded in (or implied for) `digest`.
    pub(crate) fn extract_salt(&self, digest: &[u8]) -> Result<Vec<u8>, CryptError> {
        self.core()?.extract_salt(digest)
    }

    /// Digest of `message` under an explicit `salt`, laid out like [`digest`](Self::digest).
    pub(crate) fn seal_with_salt(
        &self,
        message: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>, CryptError> {
        Ok(self.core()?.seal_with_salt(message, salt))
    }
}

impl fmt::Debug for StandardDigester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardDigester")
            .field("state", &self.state())
            .field("parameters", &self.parameters())
            .finish_non_exhaustive()
    }
}
