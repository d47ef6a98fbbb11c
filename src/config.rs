use crate::reader::Theme;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Terminal client for a personal e-book library.
#[derive(Parser, Debug, Clone)]
#[command(name = "shelf-rs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "SHELF_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the config file.
    #[arg(long, env = "SHELF_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },

    /// Log in and remember the session on this device.
    Login {
        /// Username.
        username: String,
        /// Password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create a new account.
    Register {
        /// Username.
        username: String,
        /// Password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the session on this device.
    Logout,

    /// Show who is logged in.
    Whoami,

    /// Manage your own books.
    Books {
        /// Books subcommand action.
        #[command(subcommand)]
        action: BookCommand,
    },

    /// Open a book and optionally turn pages.
    Read {
        /// Book ID.
        book_id: Option<String>,
        /// Go forward one page.
        #[arg(long, conflicts_with_all = ["prev", "goto"])]
        next: bool,
        /// Go back one page.
        #[arg(long, conflicts_with = "goto")]
        prev: bool,
        /// Jump to a page.
        #[arg(long)]
        goto: Option<u32>,
    },

    /// Show or change the reader theme.
    Theme {
        /// New theme.
        #[arg(value_enum)]
        theme: Option<Theme>,
    },

    /// Friends and shared libraries.
    Social {
        /// Social subcommand action.
        #[command(subcommand)]
        action: SocialCommand,
    },
}

/// Book management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BookCommand {
    /// List your books.
    List {
        /// Only show books whose title contains this text.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Upload a PDF.
    Upload {
        /// Path to the PDF file.
        file: PathBuf,
        /// Book title (defaults to the title embedded in the PDF).
        #[arg(short, long)]
        title: Option<String>,
        /// Optional cover image.
        #[arg(long)]
        cover: Option<PathBuf>,
        /// Make the book visible to your friends.
        #[arg(long)]
        public: bool,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete one of your books.
    Delete {
        /// Book ID.
        book_id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Social subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SocialCommand {
    /// Search users by name.
    Search {
        /// Username query.
        query: String,
    },

    /// Send a friend request.
    Request {
        /// Target user ID.
        user_id: String,
    },

    /// Accept a pending friend request.
    Accept {
        /// Requester user ID.
        user_id: String,
    },

    /// Remove a friend (revokes access to each other's libraries).
    Unfriend {
        /// Friend user ID.
        user_id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// List friends and pending requests.
    Network,

    /// Browse a friend's public books.
    Library {
        /// Friend user ID.
        friend_id: String,
        /// Only show books whose title contains this text.
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Library view configuration.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Reader configuration.
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the library API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (0 keeps the HTTP client default).
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: 0,
        }
    }
}

impl ApiConfig {
    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

fn default_base_url() -> String {
    "https://yourbooks-backend.onrender.com".to_string()
}

/// Local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the session, local progress and preferences.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Directory for downloaded documents.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("shelf-rs"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("state.db")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("shelf-rs"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("documents")
}

/// Library view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Storage quota shown by the usage meter, in megabytes.
    #[serde(default = "default_quota_mb")]
    pub quota_mb: f64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            quota_mb: default_quota_mb(),
        }
    }
}

fn default_quota_mb() -> f64 {
    100.0
}

/// Reader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Theme used until one is picked with `shelf-rs theme`.
    #[serde(default)]
    pub default_theme: Theme,
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("shelf-rs.toml"),
            dirs::config_dir()
                .map(|p| p.join("shelf-rs").join("config.toml"))
                .unwrap_or_default(),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Write the default config to `path`.
    ///
    /// The existing file is never parsed, so a broken one can be replaced
    /// with `force`.
    pub fn write_default(path: &Path, force: bool) -> crate::error::Result<()> {
        if path.exists() && !force {
            return Err(crate::error::AppError::Config(format!(
                "Config file already exists: {}. Use --force to overwrite.",
                path.display()
            )));
        }

        std::fs::write(path, Self::generate_default())?;
        Ok(())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# shelf-rs configuration

[api]
base_url = "https://yourbooks-backend.onrender.com"
# Request timeout in seconds (0 = HTTP client default)
timeout_seconds = 0

[storage]
# state_path = "/home/me/.local/share/shelf-rs/state.db"
# cache_dir = "/home/me/.cache/shelf-rs/documents"

[library]
# Quota shown by the storage meter
quota_mb = 100

[reader]
# "dark", "light" or "sepia"
default_theme = "dark"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config: Config = toml::from_str(&Config::generate_default()).unwrap();
        assert_eq!(config.api.base_url, "https://yourbooks-backend.onrender.com");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.library.quota_mb, 100.0);
        assert_eq!(config.reader.default_theme, Theme::Dark);
    }

    #[test]
    fn write_default_replaces_broken_file_only_when_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf-rs.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(Config::load(&path).is_err());

        assert!(matches!(
            Config::write_default(&path, false),
            Err(crate::error::AppError::Config(_))
        ));
        Config::write_default(&path, true).unwrap();
        assert_eq!(Config::load(&path).unwrap().library.quota_mb, 100.0);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:5000"
            timeout_seconds = 15

            [reader]
            default_theme = "sepia"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.reader.default_theme, Theme::Sepia);
        assert_eq!(config.library.quota_mb, 100.0);
    }

    #[test]
    fn cli_parses_read_navigation() {
        let cli = Cli::try_parse_from(["shelf-rs", "read", "abc", "--next"]).unwrap();
        match cli.command {
            Command::Read {
                book_id,
                next,
                prev,
                goto,
            } => {
                assert_eq!(book_id.as_deref(), Some("abc"));
                assert!(next);
                assert!(!prev);
                assert_eq!(goto, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["shelf-rs", "read", "abc", "--next", "--prev"]).is_err());
    }
}
