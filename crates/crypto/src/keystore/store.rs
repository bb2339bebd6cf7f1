//! Directory-backed collection of encrypted secrets with a decrypted
//! cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretBox};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::codec::{self, CryptoJson};
use super::error::{KeystoreError, KeystoreResult};
use crate::secret::SecretBytes;

/// Key file schema version written by [`SecretStore::save_to`].
pub const KEY_FILE_VERSION: u64 = 3;

/// Legacy schema version still accepted by [`SecretStore::load_from`].
pub const KEY_FILE_VERSION_LEGACY: u64 = 2;

/// One tracked key: its serialized `crypto` object and the file backing
/// it (`None` until the first save).
#[derive(Debug, Clone)]
struct StoredKey {
    crypto: String,
    path: Option<PathBuf>,
}

/// Directory-backed store of passphrase-encrypted secrets, keyed by UUID.
///
/// `keys` mirrors the on-disk `<uuid>.json` files; `cache` holds decrypted
/// plaintext and only ever contains entries whose MAC verified. Cached
/// bytes are zeroized on eviction and on drop. The store is not internally
/// synchronized; wrap it in a lock to share across threads.
pub struct SecretStore {
    dir: PathBuf,
    keys: HashMap<Uuid, StoredKey>,
    cache: HashMap<Uuid, SecretBytes>,
}

impl SecretStore {
    /// Open the store over `dir`, creating the directory (0700) if needed
    /// and loading every readable key file in it.
    pub fn open<P: AsRef<Path>>(dir: P) -> KeystoreResult<Self> {
        let mut store = Self {
            dir: dir.as_ref().to_path_buf(),
            keys: HashMap::new(),
            cache: HashMap::new(),
        };
        let dir = store.dir.clone();
        store.load_from(&dir)?;
        Ok(store)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ids of every tracked key, in no particular order.
    pub fn ids(&self) -> Vec<Uuid> {
        self.keys.keys().copied().collect()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.keys.contains_key(id)
    }

    /// Encrypt `secret` under `passphrase` and persist it under a fresh
    /// UUID. The plaintext is cached eagerly, so reading it back does not
    /// re-prompt.
    pub fn import_secret(&mut self, secret: &[u8], passphrase: &str) -> KeystoreResult<Uuid> {
        let id = Uuid::new_v4();
        let crypto = codec::encrypt(secret, passphrase)?;
        self.cache
            .insert(id, SecretBox::new(Box::new(secret.to_vec())));
        self.keys.insert(
            id,
            StoredKey {
                crypto: serde_json::to_string(&crypto)?,
                path: None,
            },
        );
        self.save()?;
        Ok(id)
    }

    /// Decrypted secret for `id`.
    ///
    /// Served from the cache when possible. Otherwise `passphrase` is
    /// invoked (exactly once), the entry is decrypted, cached on success
    /// and returned. A provider failure or MAC mismatch propagates and
    /// leaves the store untouched.
    pub fn secret<P>(&mut self, id: &Uuid, passphrase: P) -> KeystoreResult<SecretBytes>
    where
        P: FnOnce() -> KeystoreResult<String>,
    {
        if let Some(cached) = self.cache.get(id) {
            return Ok(SecretBox::new(Box::new(cached.expose_secret().clone())));
        }
        let stored = self.keys.get(id).ok_or(KeystoreError::KeyNotFound(*id))?;
        let crypto: CryptoJson = serde_json::from_str(&stored.crypto)?;

        let pass = Zeroizing::new(passphrase()?);
        let plain = codec::decrypt(&crypto, &pass)?;

        let out = SecretBox::new(Box::new(plain.expose_secret().clone()));
        self.cache.insert(*id, plain);
        Ok(out)
    }

    /// Remove `id` from the cache, the tracked set, and the disk.
    pub fn kill(&mut self, id: &Uuid) -> KeystoreResult<()> {
        self.cache.remove(id);
        if let Some(stored) = self.keys.remove(id) {
            if let Some(path) = stored.path {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Drop every cached plaintext. Tracked keys are unaffected.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Persist every tracked key into the store directory.
    pub fn save(&mut self) -> KeystoreResult<()> {
        let dir = self.dir.clone();
        self.save_to(&dir)
    }

    /// Persist every tracked key as `<uuid>.json` under `dir`.
    ///
    /// Files are replaced atomically (temp file + rename, 0600) and a
    /// superseded backing file at a different path is deleted.
    pub fn save_to(&mut self, dir: &Path) -> KeystoreResult<()> {
        ensure_dir(dir)?;
        for (id, stored) in &mut self.keys {
            let file = dir.join(format!("{}.json", id));
            let crypto: Value = serde_json::from_str(&stored.crypto)?;
            let document = json!({
                "crypto": crypto,
                "id": id.to_string(),
                "version": KEY_FILE_VERSION,
            });
            write_atomic(&file, &serde_json::to_string_pretty(&document)?)?;

            if let Some(previous) = stored.path.take() {
                if previous != file {
                    let _ = fs::remove_file(previous);
                }
            }
            stored.path = Some(file);
        }
        Ok(())
    }

    /// Read every regular file under `dir` into the tracked set.
    ///
    /// Entries that fail to parse (bad JSON, bad UUID, unknown version)
    /// are logged and skipped; only directory-level I/O errors fail the
    /// call.
    pub fn load_from(&mut self, dir: &Path) -> KeystoreResult<()> {
        ensure_dir(dir)?;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), "reading key file");
            match read_key_file(&path) {
                Ok((id, crypto)) => {
                    self.keys.insert(
                        id,
                        StoredKey {
                            crypto,
                            path: Some(path),
                        },
                    );
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable key file");
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("dir", &self.dir)
            .field("keys", &self.keys.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn ensure_dir(dir: &Path) -> KeystoreResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

/// Write `contents` to `path` via a same-directory temp file and rename,
/// with 0600 permissions.
fn write_atomic(path: &Path, contents: &str) -> KeystoreResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

/// Parse one key file: `{"crypto": ..., "id": ..., "version": 2|3}`.
///
/// The legacy capitalized `Version` key (string-valued) is also accepted.
fn read_key_file(path: &Path) -> KeystoreResult<(Uuid, String)> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let object = value
        .as_object()
        .ok_or_else(|| KeystoreError::MalformedKeyFile("not a JSON object".to_string()))?;

    let version = match (object.get("Version"), object.get("version")) {
        (Some(Value::String(s)), _) => s.parse::<u64>().map_err(|_| {
            KeystoreError::MalformedKeyFile(format!("non-numeric Version {:?}", s))
        })?,
        (None, Some(v)) => v
            .as_u64()
            .ok_or_else(|| KeystoreError::MalformedKeyFile("non-integer version".to_string()))?,
        _ => return Err(KeystoreError::MalformedKeyFile("missing version".to_string())),
    };
    if version != KEY_FILE_VERSION && version != KEY_FILE_VERSION_LEGACY {
        return Err(KeystoreError::MalformedKeyFile(format!(
            "unsupported version {}",
            version
        )));
    }

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| KeystoreError::MalformedKeyFile("missing id".to_string()))?;
    let id = Uuid::parse_str(id).map_err(|_| KeystoreError::MalformedUuid(id.to_string()))?;

    let crypto = object
        .get("crypto")
        .ok_or_else(|| KeystoreError::MalformedKeyFile("missing crypto object".to_string()))?;

    // Entries this reader can never decrypt are skipped up front.
    let parsed: CryptoJson = serde_json::from_value(crypto.clone())?;
    if parsed.kdf != "pbkdf2" {
        return Err(KeystoreError::UnsupportedKdf(parsed.kdf));
    }
    if parsed.cipher != "aes-128-cbc" {
        return Err(KeystoreError::UnsupportedCipher(parsed.cipher));
    }

    Ok((id, serde_json::to_string(crypto)?))
}
