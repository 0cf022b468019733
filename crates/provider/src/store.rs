use aes_gcm::aead::{Aead, Key, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use rand::Rng;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const NONCE_LEN: usize = 12;

/// Synchronous string key-value slot used to persist credentials.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// AES-256-GCM encrypted JSON map on disk. The key lives next to the data
/// file and both are written with 0600 permissions on unix.
pub struct FileStore {
    path: PathBuf,
    key_path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key_path = path.with_file_name(".secret_key");
        Self {
            path,
            key_path,
            lock: Mutex::new(()),
        }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "keygate", "keygate")
            .ok_or_else(|| anyhow!("Could not determine project directories"))?;
        Ok(proj_dirs.data_dir().join("credentials.bin"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One key-file read per store operation.
    fn cipher(&self) -> Result<Aes256Gcm> {
        let key = self.get_or_create_key()?;
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)))
    }

    fn read_with(&self, cipher: &Aes256Gcm) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let sealed = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&unseal(cipher, &sealed)?)?)
    }

    fn write_with(&self, cipher: &Aes256Gcm, values: &HashMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let sealed = seal(cipher, &serde_json::to_vec(values)?)?;
        write_secure_file(&self.path, &sealed)
    }

    fn get_or_create_key(&self) -> Result<[u8; 32]> {
        if self.key_path.exists() {
            let key_bytes = fs::read(&self.key_path)?;
            if let Ok(key) = <[u8; 32]>::try_from(key_bytes.as_slice()) {
                return Ok(key);
            }
            tracing::warn!("Secret key has unexpected length, generating a new one");
        }

        if let Some(dir) = self.key_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key);
        write_secure_file(&self.key_path, &key)?;
        Ok(key)
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        if !self.path.exists() {
            return None;
        }
        match self.cipher().and_then(|cipher| self.read_with(&cipher)) {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("Store lock poisoned"))?;
        let cipher = self.cipher()?;
        // An unreadable file is replaced rather than blocking every future write.
        let mut values = self.read_with(&cipher).unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_with(&cipher, &values)
    }
}

/// Output layout: 12-byte random nonce followed by the ciphertext.
fn seal(cipher: &Aes256Gcm, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| anyhow!("Encryption failed"))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

fn unseal(cipher: &Aes256Gcm, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(anyhow!("Credential file is truncated"));
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| anyhow!("Decryption failed"))
}

fn write_secure_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
