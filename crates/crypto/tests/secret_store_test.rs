//! Integration tests for the encrypted secret store
//!
//! These tests verify the complete key lifecycle:
//! - Import -> persist -> reopen -> decrypt
//! - Deletion removes both the entry and its backing file
//! - Restored secrets still drive signing and recovery

use ember_crypto::keystore::{KeystoreResult, SecretStore};
use ember_crypto::{recover, sign, to_public, Hash256, Secret};
use secrecy::ExposeSecret;
use tempfile::TempDir;

fn pass(s: &str) -> impl FnOnce() -> KeystoreResult<String> {
    let s = s.to_string();
    move || Ok(s)
}

/// Import two secrets, reopen the directory with a fresh store, read both
/// back, kill one, and check that only the other survives a second reopen.
#[test]
fn test_store_lifecycle_across_reopen() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let s1 = [0x11u8; 32];
    let s2 = [0x22u8; 32];

    let (id1, id2) = {
        let mut store = SecretStore::open(dir.path()).unwrap();
        let id1 = store.import_secret(&s1, "passphrase-a").unwrap();
        let id2 = store.import_secret(&s2, "passphrase-b").unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
        (id1, id2)
    };

    // A fresh store over the same directory sees both keys and decrypts
    // them with the right passphrases.
    let mut store = SecretStore::open(dir.path()).unwrap();
    assert_eq!(store.len(), 2);

    let got1 = store.secret(&id1, pass("passphrase-a")).unwrap();
    let got2 = store.secret(&id2, pass("passphrase-b")).unwrap();
    assert_eq!(got1.expose_secret().as_slice(), &s1);
    assert_eq!(got2.expose_secret().as_slice(), &s2);

    // Kill the first key: its file is gone and reads fail, while the
    // second key is untouched.
    let file1 = dir.path().join(format!("{}.json", id1));
    assert!(file1.exists());
    store.kill(&id1).unwrap();
    assert!(!file1.exists());
    assert!(store.secret(&id1, pass("passphrase-a")).is_err());

    let mut reopened = SecretStore::open(dir.path()).unwrap();
    assert_eq!(reopened.ids(), vec![id2]);
    assert!(reopened.secret(&id1, pass("passphrase-a")).is_err());
    assert_eq!(
        reopened
            .secret(&id2, pass("passphrase-b"))
            .unwrap()
            .expose_secret()
            .as_slice(),
        &s2
    );
}

/// A secret restored from disk must behave exactly like the original:
/// signatures made with it recover to the same public key.
#[test]
fn test_restored_secret_signs_correctly() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let secret = Secret::random(&mut rand::thread_rng());
    let public = to_public(&secret).unwrap();

    let id = {
        let mut store = SecretStore::open(dir.path()).unwrap();
        store
            .import_secret(secret.as_bytes(), "integration-passphrase")
            .unwrap()
    };

    let mut store = SecretStore::open(dir.path()).unwrap();
    let restored = store.secret(&id, pass("integration-passphrase")).unwrap();
    let restored = Secret::from_bytes(
        restored
            .expose_secret()
            .as_slice()
            .try_into()
            .expect("stored secret is 32 bytes"),
    );

    let hash = Hash256::from_slice(&[0x5Au8; 32]);
    let sig = sign(&restored, &hash).unwrap();
    assert!(sig.is_valid());
    assert_eq!(recover(&sig, &hash).unwrap(), public);
}

/// The wrong passphrase is rejected without revealing anything, and a
/// later attempt with the right one still succeeds.
#[test]
fn test_wrong_passphrase_then_retry() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let secret = [0x33u8; 32];
    let id = {
        let mut store = SecretStore::open(dir.path()).unwrap();
        store.import_secret(&secret, "right").unwrap()
    };

    let mut store = SecretStore::open(dir.path()).unwrap();
    assert!(store.secret(&id, pass("wrong")).is_err());

    let got = store.secret(&id, pass("right")).unwrap();
    assert_eq!(got.expose_secret().as_slice(), &secret);
}
