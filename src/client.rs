// Client records, launch handles and the store contract the core talks to

use crate::errors::{safe_lock, FleetError, FleetResult};
use crate::scan::scanner::path_key;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// User-assigned health of a client account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClientStatus {
    #[default]
    Active,
    Frozen,
    /// Account is lost; the launcher refuses to start it
    Crash,
}

/// Answer to "what happened to this client?" after its process exits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDecision {
    pub status: ClientStatus,
    pub comment: Option<String>,
}

impl StatusDecision {
    pub fn new(status: ClientStatus) -> Self {
        Self {
            status,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One configured instance of the messenger executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub exe_path: PathBuf,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub status_comment: Option<String>,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub last_opened_unix: Option<u64>,
}

impl Client {
    /// New active client named after the folder that holds the executable
    pub fn from_exe_path(exe_path: impl Into<PathBuf>) -> Self {
        let exe_path = exe_path.into();
        let name = exe_path
            .parent()
            .and_then(|p| p.file_name())
            .or_else(|| exe_path.file_stem())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "client".to_string());

        Self {
            name,
            exe_path,
            arguments: None,
            status: ClientStatus::Active,
            status_comment: None,
            is_selected: false,
            last_opened_unix: None,
        }
    }

    pub fn selected(mut self, is_selected: bool) -> Self {
        self.is_selected = is_selected;
        self
    }

    pub fn with_status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_same_exe(&self, exe_path: &Path) -> bool {
        path_key(&self.exe_path) == path_key(exe_path)
    }
}

/// A started client process, as handed to the arranger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHandle {
    pub process_id: u32,
    pub exe_path_hint: PathBuf,
}

impl ClientHandle {
    pub fn new(process_id: u32, exe_path_hint: impl Into<PathBuf>) -> Self {
        Self {
            process_id,
            exe_path_hint: exe_path_hint.into(),
        }
    }
}

/// Persisted client list, implemented by the application's store
pub trait ClientStore: Send + Sync {
    fn enumerate_all(&self) -> Vec<Client>;

    /// Apply a status decision to the client with this executable
    fn record_status(&self, exe_path: &Path, decision: &StatusDecision) -> FleetResult<()>;

    /// Remember when a client was last started
    fn record_launch(&self, _exe_path: &Path, _at: SystemTime) -> FleetResult<()> {
        Ok(())
    }

    /// Add a client per new executable path; returns how many were added
    fn add_discovered(&self, paths: &[PathBuf]) -> FleetResult<usize>;
}

/// Client list kept in memory and optionally mirrored to a JSON file
#[derive(Debug)]
pub struct JsonClientStore {
    path: Option<PathBuf>,
    clients: Mutex<Vec<Client>>,
}

impl JsonClientStore {
    pub fn in_memory(clients: Vec<Client>) -> Self {
        Self {
            path: None,
            clients: Mutex::new(clients),
        }
    }

    /// Load the list from `path`; a missing file starts an empty list
    pub fn open(path: impl Into<PathBuf>) -> FleetResult<Self> {
        let path = path.into();
        let clients = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                FleetError::StoreError(format!("{} is not a client list: {}", path.display(), e))
            })?
        } else {
            Vec::new()
        };
        debug!("Loaded {} client(s) from {}", clients.len(), path.display());

        Ok(Self {
            path: Some(path),
            clients: Mutex::new(clients),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        safe_lock(&self.clients, "client list").map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn save(&self) -> FleetResult<()> {
        let clients = safe_lock(&self.clients, "client list")?;
        self.write(&clients)
    }

    fn write(&self, clients: &[Client]) -> FleetResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(clients)?)?;
        Ok(())
    }

    fn update<F>(&self, exe_path: &Path, apply: F) -> FleetResult<()>
    where
        F: FnOnce(&mut Client),
    {
        let mut clients = safe_lock(&self.clients, "client list")?;
        let client = clients
            .iter_mut()
            .find(|c| c.is_same_exe(exe_path))
            .ok_or_else(|| {
                FleetError::StoreError(format!("No client for {}", exe_path.display()))
            })?;
        apply(client);
        self.write(&clients)
    }
}

impl ClientStore for JsonClientStore {
    fn enumerate_all(&self) -> Vec<Client> {
        safe_lock(&self.clients, "client list")
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn record_status(&self, exe_path: &Path, decision: &StatusDecision) -> FleetResult<()> {
        self.update(exe_path, |client| {
            client.status = decision.status;
            client.status_comment = decision.comment.clone();
        })
    }

    fn record_launch(&self, exe_path: &Path, at: SystemTime) -> FleetResult<()> {
        let secs = at.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        self.update(exe_path, |client| client.last_opened_unix = Some(secs))
    }

    fn add_discovered(&self, paths: &[PathBuf]) -> FleetResult<usize> {
        let mut clients = safe_lock(&self.clients, "client list")?;
        let mut known: HashSet<String> = clients.iter().map(|c| path_key(&c.exe_path)).collect();

        let mut added = 0;
        for path in paths {
            if known.insert(path_key(path)) {
                clients.push(Client::from_exe_path(path.clone()));
                added += 1;
            }
        }

        if added > 0 {
            self.write(&clients)?;
            info!("Added {} discovered client(s), {} total", added, clients.len());
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_named_after_folder() {
        let client = Client::from_exe_path("D:/accounts/alice/Telegram.exe");
        assert_eq!(client.name, "alice");
        assert_eq!(client.status, ClientStatus::Active);
        assert!(!client.is_selected);
    }

    #[test]
    fn test_add_discovered_skips_known_paths() {
        let store = JsonClientStore::in_memory(vec![Client::from_exe_path("/a/Telegram.exe")]);
        let added = store
            .add_discovered(&[
                PathBuf::from("/A/telegram.EXE"),
                PathBuf::from("/b/Telegram.exe"),
                PathBuf::from("/b/Telegram.exe"),
            ])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_record_status_for_unknown_client_fails() {
        let store = JsonClientStore::in_memory(Vec::new());
        let result = store.record_status(
            Path::new("/nope/Telegram.exe"),
            &StatusDecision::new(ClientStatus::Frozen),
        );
        assert!(matches!(result, Err(FleetError::StoreError(_))));
    }

    #[test]
    fn test_store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clients.json");

        let store = JsonClientStore::open(&path).unwrap();
        assert!(store.is_empty());
        store
            .add_discovered(&[PathBuf::from("/x/bob/Telegram.exe")])
            .unwrap();
        store
            .record_status(
                Path::new("/x/bob/Telegram.exe"),
                &StatusDecision::new(ClientStatus::Frozen).with_comment("spam block"),
            )
            .unwrap();

        let reopened = JsonClientStore::open(&path).unwrap();
        let clients = reopened.enumerate_all();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "bob");
        assert_eq!(clients[0].status, ClientStatus::Frozen);
        assert_eq!(clients[0].status_comment.as_deref(), Some("spam block"));
    }
}
