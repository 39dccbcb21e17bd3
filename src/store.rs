use std::cell::RefCell;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::db::{delete_record, get_connection, get_record, init_db, set_record};
use crate::error::Result;
use crate::models::{normalize, Rule, RuleSet};
use crate::settings::{Backend, Settings};

/// Name of the persisted learning-rules record.
pub const RULES_STORAGE_KEY: &str = "finmon_learning_rules";

/// Durable home of the [`RuleSet`].
///
/// Reads never fail: a missing or corrupt record is an empty set. Writes
/// report failure through `Result` and are never retried.
pub trait RuleStore {
    fn load(&self) -> RuleSet;

    fn save(&self, rules: &RuleSet) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Read-modify-write. `apply` returns whether it changed the set; the
    /// store only writes when it did. Returns whether a write happened.
    fn update(&self, apply: &mut dyn FnMut(&mut RuleSet) -> bool) -> Result<bool> {
        let mut rules = self.load();
        if !apply(&mut rules) {
            return Ok(false);
        }
        self.save(&rules)?;
        Ok(true)
    }
}

/// Parses a persisted record entry by entry. Entries that don't parse, or
/// normalize to an empty keyword or category, are dropped; duplicates of an
/// earlier `(keyword, category)` pair are dropped too.
pub(crate) fn decode(payload: &str) -> RuleSet {
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(payload) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "learning rules record is corrupt; treating as empty");
            return RuleSet::new();
        }
    };

    let mut rules = RuleSet::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let mut rule = match serde_json::from_value::<Rule>(entry) {
            Ok(rule) => rule,
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping unreadable learned rule");
                continue;
            }
        };
        rule.keyword = normalize(&rule.keyword);
        rule.category = rule.category.trim().to_string();
        if rule.keyword.is_empty() || rule.category.is_empty() {
            tracing::warn!(index, "dropping learned rule with empty keyword or category");
            continue;
        }
        if rules.find(&rule.keyword, &rule.category).is_some() {
            tracing::debug!(index, keyword = %rule.keyword, "dropping duplicate learned rule");
            continue;
        }
        rules.push(rule);
    }
    rules
}

fn encode(rules: &RuleSet) -> Result<String> {
    Ok(serde_json::to_string(rules)?)
}

/// File holding the learned rules for the configured backend.
pub fn storage_path(settings: &Settings) -> PathBuf {
    let data_dir = PathBuf::from(&settings.data_dir);
    match settings.backend {
        Backend::Sqlite => data_dir.join("finmon.db"),
        Backend::Json => data_dir.join(format!("{RULES_STORAGE_KEY}.json")),
    }
}

/// Opens the store selected in settings, creating the data directory.
pub fn open(settings: &Settings) -> Result<Box<dyn RuleStore>> {
    std::fs::create_dir_all(&settings.data_dir)?;
    let path = storage_path(settings);
    let store: Box<dyn RuleStore> = match settings.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&path)?),
        Backend::Json => Box::new(JsonFileStore::new(path)),
    };
    Ok(store)
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::from_connection(get_connection(db_path)?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    fn read(conn: &Connection) -> RuleSet {
        match get_record(conn, RULES_STORAGE_KEY) {
            Ok(Some(payload)) => decode(&payload),
            Ok(None) => RuleSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read learning rules");
                RuleSet::new()
            }
        }
    }
}

impl RuleStore for SqliteStore {
    fn load(&self) -> RuleSet {
        Self::read(&self.conn)
    }

    fn save(&self, rules: &RuleSet) -> Result<()> {
        set_record(&self.conn, RULES_STORAGE_KEY, &encode(rules)?)
    }

    fn clear(&self) -> Result<()> {
        delete_record(&self.conn, RULES_STORAGE_KEY)
    }

    fn update(&self, apply: &mut dyn FnMut(&mut RuleSet) -> bool) -> Result<bool> {
        // IMMEDIATE takes the write lock up front so two writers can't both
        // read the old record.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        // A record that can't be read must fail the write, not be replaced.
        let mut rules = match get_record(&tx, RULES_STORAGE_KEY)? {
            Some(payload) => decode(&payload),
            None => RuleSet::new(),
        };
        if !apply(&mut rules) {
            return Ok(false);
        }
        set_record(&tx, RULES_STORAGE_KEY, &encode(&rules)?)?;
        tx.commit()?;
        Ok(true)
    }
}

/// One JSON file per user. Saves go through a temp file and a rename.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RuleStore for JsonFileStore {
    fn load(&self) -> RuleSet {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => decode(&payload),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RuleSet::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read learning rules");
                RuleSet::new()
            }
        }
    }

    fn save(&self, rules: &RuleSet) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| RULES_STORAGE_KEY.to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));
        let written =
            std::fs::write(&tmp, encode(rules)?).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the serialized record in memory. Single-threaded only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payload: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw record, valid or not.
    pub fn with_payload(payload: &str) -> Self {
        Self {
            payload: RefCell::new(Some(payload.to_string())),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl RuleStore for MemoryStore {
    fn load(&self) -> RuleSet {
        self.payload
            .borrow()
            .as_deref()
            .map(decode)
            .unwrap_or_default()
    }

    fn save(&self, rules: &RuleSet) -> Result<()> {
        *self.payload.borrow_mut() = Some(encode(rules)?);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.payload.borrow_mut() = None;
        Ok(())
    }
}
