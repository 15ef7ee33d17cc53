use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::state::session::Credentials;

/// Where the project collection is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Json,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(BackendKind::Sqlite),
            "json" => Ok(BackendKind::Json),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Json => "json",
            BackendKind::Memory => "memory",
        })
    }
}

pub struct Config {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub seed_path: PathBuf,
    pub admin: Credentials,
    pub persist_session: bool,
}

impl Config {
    /// Load from `FOLIO_*` environment variables, with defaults
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("FOLIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            backend: try_load(&lookup, "FOLIO_BACKEND", BackendKind::Sqlite),
            data_dir,
            seed_path: lookup("FOLIO_SEED")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/projects.json")),
            admin: Credentials::new(
                lookup("FOLIO_ADMIN_ID").unwrap_or_else(|| "admin".to_string()),
                lookup("FOLIO_ADMIN_PASSWORD").unwrap_or_else(|| {
                    warn!("FOLIO_ADMIN_PASSWORD not set, using the default password");
                    "1234".to_string()
                }),
            ),
            persist_session: try_load(&lookup, "FOLIO_PERSIST_SESSION", true),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("folio.db")
    }

    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

/// ~/.local/share/folio on Linux, the platform equivalent elsewhere
fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("folio");
    path
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
        default
    })
}
