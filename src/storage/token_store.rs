//! Durable token persistence.
//!
//! Two string entries under fixed keys; absence of either is a valid state. The file
//! backend writes a small JSON object and replaces it atomically on every save.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::ClientResult;

pub const ACCESS_KEY: &str = "pn_access_token";
pub const REFRESH_KEY: &str = "pn_refresh_token";

/// What `load()` returns: either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool { self.access_token.is_none() && self.refresh_token.is_none() }
}

/// What `save()` takes: the access token is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new<A: Into<String>>(access_token: A, refresh_token: Option<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token }
    }
}

pub trait TokenStore: Send + Sync {
    /// Never fails; missing or unreadable storage yields empty tokens.
    fn load(&self) -> StoredTokens;
    /// Persists both fields. A pair without a refresh token removes any stored one.
    fn save(&self, tokens: &TokenPair) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

fn to_entries(tokens: &TokenPair) -> BTreeMap<String, String> {
    let mut m = BTreeMap::new();
    m.insert(ACCESS_KEY.to_string(), tokens.access_token.clone());
    if let Some(r) = tokens.refresh_token.as_ref().filter(|r| !r.is_empty()) {
        m.insert(REFRESH_KEY.to_string(), r.clone());
    }
    m
}

fn from_entries(m: &BTreeMap<String, String>) -> StoredTokens {
    StoredTokens {
        access_token: m.get(ACCESS_KEY).filter(|s| !s.is_empty()).cloned(),
        refresh_token: m.get(REFRESH_KEY).filter(|s| !s.is_empty()).cloned(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_tokens(tokens: &TokenPair) -> Self {
        Self { entries: Mutex::new(to_entries(tokens)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StoredTokens { from_entries(&self.entries.lock()) }

    fn save(&self, tokens: &TokenPair) -> ClientResult<()> {
        *self.entries.lock() = to_entries(tokens);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        self.entries.lock().clear();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() { fs::create_dir_all(dir)?; }
        }
        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        set_owner_only(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StoredTokens {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredTokens::default(),
            Err(e) => {
                warn!(path = %self.path.display(), "cannot read token file: {}", e);
                return StoredTokens::default();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(m) => from_entries(&m),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring corrupt token file: {}", e);
                StoredTokens::default()
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> ClientResult<()> {
        self.write_entries(&to_entries(tokens))?;
        debug!(path = %self.path.display(), has_refresh = tokens.refresh_token.is_some(), "tokens saved");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> ClientResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> ClientResult<()> { Ok(()) }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pair(a: &str, r: Option<&str>) -> TokenPair { TokenPair::new(a, r.map(|s| s.to_string())) }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("none.json"));
        assert!(store.load().is_empty());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn file_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("tokens.json"));
        store.save(&pair("acc", Some("ref"))).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.access_token.as_deref(), Some("acc"));
        assert_eq!(loaded.refresh_token.as_deref(), Some("ref"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(ACCESS_KEY) && raw.contains(REFRESH_KEY));

        store.clear().unwrap();
        assert!(store.load().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_without_refresh_drops_stale_refresh() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.save(&pair("a1", Some("r1"))).unwrap();
        store.save(&pair("a2", None)).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.access_token.as_deref(), Some("a2"));
        assert_eq!(loaded.refresh_token, None);

        let mem = MemoryTokenStore::with_tokens(&pair("a1", Some("r1")));
        mem.save(&pair("a2", None)).unwrap();
        assert_eq!(mem.load().refresh_token, None);
    }

    #[test]
    fn corrupt_file_is_treated_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileTokenStore::new(&path).load().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.save(&pair("a", None)).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
