pub mod fixtures;

use fixtures::{PASSWORD, RecordingProvider, TEST_ITERATIONS, setup_encryptor, setup_pool};
use pbecrypt::BigInt;
use pbecrypt::prelude::*;
use pbecrypt::provider::ProviderError;
use pbecrypt::salt::SaltGenerator;
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn encrypt_decrypt_roundtrip_for_every_algorithm_and_layout() {
    let message = b"The quick brown fox jumps over the lazy dog";

    for algorithm in [
        algorithms::PBE_HMAC_SHA256_AES_256_GCM,
        algorithms::PBE_HMAC_SHA512_AES_256_GCM,
        algorithms::PBE_HMAC_SHA256_CHACHA20_POLY1305,
    ] {
        for invert in [false, true] {
            let encryptor = setup_encryptor();
            encryptor.set_algorithm(algorithm).unwrap();
            encryptor.set_invert_salt_in_output(invert).unwrap();

            let encrypted = encryptor.encrypt(message).expect("encrypt failed");
            assert_eq!(encrypted.len(), 16 + message.len() + 16);

            let decrypted = encryptor.decrypt(&encrypted).expect("decrypt failed");
            assert_eq!(decrypted, message);
        }
    }
}

#[test]
fn empty_message_roundtrip() {
    let encryptor = setup_encryptor();
    let encrypted = encryptor.encrypt(b"").unwrap();
    assert_eq!(encryptor.decrypt(&encrypted).unwrap(), b"");
}

#[test]
fn random_salts_make_every_encryption_distinct() {
    let encryptor = setup_encryptor();
    let results: HashSet<Vec<u8>> =
        (0..100).map(|_| encryptor.encrypt(b"same message").unwrap()).collect();

    assert_eq!(results.len(), 100);
}

#[test]
fn flipping_any_byte_is_detected() {
    let encryptor = setup_encryptor();
    let encrypted = encryptor.encrypt(b"tamper-evident message").unwrap();

    for index in 0..encrypted.len() {
        let mut tampered = encrypted.clone();
        tampered[index] ^= 0x01;
        assert_eq!(
            encryptor.decrypt(&tampered),
            Err(CryptError::OperationNotPossible),
            "tampering at byte {index} went unnoticed"
        );
    }
}

#[test]
fn wrong_password_is_indistinguishable_from_tampering() {
    let encrypted = setup_encryptor().encrypt(b"secret").unwrap();

    let other = StandardPbeEncryptor::new();
    other.set_password("not-the-password").unwrap();
    other.set_key_obtention_iterations(TEST_ITERATIONS).unwrap();

    assert_eq!(other.decrypt(&encrypted), Err(CryptError::OperationNotPossible));
    assert_eq!(other.decrypt(&encrypted[..10]), Err(CryptError::OperationNotPossible));
}

#[test]
fn fixed_salt_encryption_is_deterministic() {
    let make = || {
        let encryptor = setup_encryptor();
        encryptor
            .set_salt_generator(SaltGeneratorKind::Fixed(b"0123456789abcdef".to_vec()))
            .unwrap();
        encryptor
    };
    let first = make();
    let second = make();

    let a = first.encrypt(b"deterministic").unwrap();
    let b = second.encrypt(b"deterministic").unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), b"deterministic".len() + 16, "fixed salts must not be embedded");
    assert_eq!(second.decrypt(&a).unwrap(), b"deterministic");
}

#[test]
fn fixed_salt_shorter_than_algorithm_salt_fails_cleanly() {
    let encryptor = setup_encryptor();
    encryptor.set_salt_generator(SaltGeneratorKind::Fixed(b"short".to_vec())).unwrap();
    assert!(matches!(encryptor.initialize(), Err(CryptError::Initialization { .. })));
}

#[test]
fn digest_matches_only_the_original_message() {
    let digester = StandardDigester::new();
    digester.set_iterations(TEST_ITERATIONS).unwrap();

    let digest = digester.digest(b"p4ssw0rd").unwrap();
    assert!(digester.matches(b"p4ssw0rd", &digest).unwrap());
    assert!(!digester.matches(b"p4ssw0rD", &digest).unwrap());
}

/// Embedded, but always the same, so layouts can be compared byte for byte.
#[derive(Debug)]
struct PinnedSalt;

impl SaltGenerator for PinnedSalt {
    fn generate_salt(&self, len: usize) -> Result<Vec<u8>, ProviderError> {
        Ok(vec![0x5A; len])
    }

    fn includes_plain_salt(&self) -> bool {
        true
    }
}

#[test]
fn all_four_digest_layouts_roundtrip_and_differ() {
    let mut layouts = HashSet::new();

    for invert_position in [false, true] {
        for invert_output in [false, true] {
            let digester = StandardDigester::new();
            digester.set_iterations(3).unwrap();
            digester.set_invert_salt_position(invert_position).unwrap();
            digester.set_invert_salt_in_output(invert_output).unwrap();
            digester.set_salt_generator(SaltGeneratorKind::custom(PinnedSalt)).unwrap();

            let digest = digester.digest(b"layout").unwrap();
            assert!(digester.matches(b"layout", &digest).unwrap());
            assert!(!digester.matches(b"layouts", &digest).unwrap());

            let salt = if invert_output { &digest[32..] } else { &digest[..8] };
            assert_eq!(salt, [0x5A; 8]);

            layouts.insert(digest);
        }
    }

    assert_eq!(layouts.len(), 4);
}

#[test]
fn embedded_salt_position_follows_output_flag() {
    let digester = StandardDigester::new();
    digester.set_iterations(1).unwrap();
    digester.set_invert_salt_in_output(true).unwrap();

    let digest = digester.digest(b"tail").unwrap();
    let (hash, salt) = digest.split_at(32);

    let reference = StandardDigester::new();
    reference.set_iterations(1).unwrap();
    reference.set_salt_generator(SaltGeneratorKind::Fixed(salt.to_vec())).unwrap();
    assert_eq!(reference.digest(b"tail").unwrap(), hash);
}

#[test]
fn rfc2307_md5_digest() {
    let digester = StringDigester::new(
        StandardDigester::new(),
        DigestFormat::new(StringOutputType::Base64).with_prefix("{MD5}"),
    );
    digester.digester().set_algorithm("MD5").unwrap();
    digester.digester().set_iterations(1).unwrap();
    digester.digester().set_salt_size_bytes(0).unwrap();

    let digest = digester.digest("password").unwrap();
    assert_eq!(digest, "{MD5}X03MO1qnZdYdgyfeuILPmQ==");
    assert!(digester.matches("password", "{MD5}X03MO1qnZdYdgyfeuILPmQ==").unwrap());
    assert!(!digester.matches("Password", &digest).unwrap());
    assert_eq!(
        digester.matches("password", "X03MO1qnZdYdgyfeuILPmQ=="),
        Err(CryptError::OperationNotPossible)
    );
}

#[test]
fn hexadecimal_sha1_digest_is_upper_case() {
    let digester = StringDigester::new(
        StandardDigester::new(),
        DigestFormat::new(StringOutputType::Hexadecimal),
    );
    digester.digester().set_algorithm(algorithms::SHA_1).unwrap();
    digester.digester().set_iterations(1).unwrap();
    digester.digester().set_salt_size_bytes(0).unwrap();

    assert_eq!(digester.digest("abc").unwrap(), "A9993E364706816ABA3E25717850C26C9CD0D89D");
}

#[test]
fn pool_distributes_round_robin() {
    let provider = RecordingProvider::default();
    let pool = setup_pool(4);
    pool.set_provider(provider.clone()).unwrap();

    let encrypted: Vec<_> = (0..8).map(|_| pool.encrypt(b"pooled").unwrap()).collect();

    assert_eq!(provider.ciphers_created(), 4);
    assert_eq!(provider.encryptions(), vec![0, 1, 2, 3, 0, 1, 2, 3]);

    for item in &encrypted {
        assert_eq!(pool.decrypt(item).unwrap(), b"pooled");
    }
}

#[test]
fn pool_size_from_config() {
    let pool = PooledPbeEncryptor::new();
    pool.set_config(
        SimplePbeConfig::new()
            .with_password(PASSWORD)
            .with_key_obtention_iterations(TEST_ITERATIONS)
            .with_pool_size(3),
    )
    .unwrap();

    pool.initialize().unwrap();
    assert_eq!(pool.pool_size(), Some(3));
}

#[test]
fn concurrent_first_use_initializes_once() {
    let provider = RecordingProvider::default();
    let encryptor = Arc::new(setup_encryptor());
    encryptor.set_provider(provider.clone()).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..8u8 {
            let encryptor = Arc::clone(&encryptor);
            scope.spawn(move || {
                let message = [worker; 32];
                let encrypted = encryptor.encrypt(&message).expect("encrypt failed");
                assert_eq!(encryptor.decrypt(&encrypted).expect("decrypt failed"), message);
            });
        }
    });

    assert_eq!(provider.ciphers_created(), 1);
    assert_eq!(provider.encryptions().len(), 8);
}

#[test]
fn concurrent_pool_use() {
    let pool = Arc::new(setup_pool(4));

    std::thread::scope(|scope| {
        for worker in 0..8u8 {
            let pool = Arc::clone(&pool);
            scope.spawn(move || {
                for _ in 0..4 {
                    let encrypted = pool.encrypt(&[worker]).unwrap();
                    assert_eq!(pool.decrypt(&encrypted).unwrap(), [worker]);
                }
            });
        }
    });
}

#[test]
fn string_encryptor_over_pool() {
    let encryptor = PbeStringEncryptor::new(setup_pool(2), StringOutputType::Hexadecimal);

    let encrypted = encryptor.encrypt("pooled text").unwrap();
    assert_eq!(encryptor.decrypt(&encrypted).unwrap(), "pooled text");
    assert_eq!(encryptor.decrypt(&encrypted.to_ascii_lowercase()).unwrap(), "pooled text");
}

#[test]
fn bigint_encryptor_roundtrip() {
    let encryptor = PbeBigIntEncryptor::new(setup_encryptor());
    let value = BigInt::parse_bytes(b"-98765432109876543210", 10).unwrap();

    let encrypted = encryptor.encrypt(&value).unwrap();
    assert_eq!(encryptor.decrypt(&encrypted).unwrap(), value);
}

#[test]
fn engine_from_json_config() {
    let config: SimplePbeConfig = serde_json::from_str(&format!(
        r#"{{
            "algorithm": "PBEWithHMACSHA256AndCHACHA20_POLY1305",
            "password": "{PASSWORD}",
            "key_obtention_iterations": {TEST_ITERATIONS},
            "provider_name": "rustcrypto",
            "salt_generator": "random",
            "invert_salt_in_output": true
        }}"#
    ))
    .unwrap();

    let encryptor = StandardPbeEncryptor::new();
    encryptor.set_config(config).unwrap();

    let encrypted = encryptor.encrypt(b"from json").unwrap();
    assert_eq!(encryptor.decrypt(&encrypted).unwrap(), b"from json");

    let params = encryptor.parameters().unwrap();
    assert_eq!(params.algorithm, algorithms::PBE_HMAC_SHA256_CHACHA20_POLY1305);
    assert!(params.invert_salt_in_output);
}

#[test]
fn digester_from_toml_config() {
    let config: SimpleDigesterConfig = toml::from_str(
        r#"
        algorithm = "SHA-512"
        iterations = 7
        salt_size_bytes = 16
        salt_generator = "random"
        invert_salt_position = true
        invert_salt_in_output = true
        "#,
    )
    .unwrap();

    let digester = StandardDigester::new();
    digester.set_config(config).unwrap();

    let digest = digester.digest(b"from toml").unwrap();
    assert_eq!(digest.len(), 64 + 16);
    assert!(digester.matches(b"from toml", &digest).unwrap());
}

#[test]
fn registered_provider_is_found_by_name() {
    let provider = RecordingProvider::default();
    let registry = Registry::default().with_provider(provider.clone());

    let encryptor = setup_encryptor();
    encryptor.set_registry(registry).unwrap();
    encryptor.set_provider_name("recording").unwrap();

    let encrypted = encryptor.encrypt(b"by name").unwrap();
    assert_eq!(encryptor.decrypt(&encrypted).unwrap(), b"by name");
    assert_eq!(encryptor.parameters().unwrap().provider, "Recording");
    assert_eq!(provider.encryptions(), vec![0]);
}
