//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over the
//! document store holding users, animals and training logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use trainlog::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data/trainlog.db".into() }.create_client().await?;
//!
//! // Use remote Turso
//! let db = DatabaseProvider::Turso { url, auth_token }.create_client().await?;
//! ```

use crate::types::{Animal, Page, Result, TrainingLog, User, UserSummary};
use crate::utils::toml_config::DatabaseConfig;
use async_trait::async_trait;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Box<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Box::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Box::new(client))
            }
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Box::new(client))
            }
        }
    }

    /// Short label for logs; never includes credentials.
    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseProvider::Memory => "memory",
            DatabaseProvider::SQLite { .. } => "sqlite",
            DatabaseProvider::Turso { .. } => "turso",
        }
    }

    /// Pick a provider from the `[database]` section. Remote Turso wins when
    /// both of its environment variables are set and non-empty.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        if let (Some(url_env), Some(token_env)) = (&config.turso_url_env, &config.turso_token_env)
        {
            if let (Ok(url), Ok(token)) = (std::env::var(url_env), std::env::var(token_env)) {
                if !url.is_empty() && !token.is_empty() {
                    return DatabaseProvider::Turso {
                        url,
                        auth_token: token,
                    };
                }
            }
        }

        if config.url.is_empty() || config.url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: config.url.clone(),
            }
        }
    }
}

/// Abstract trait for database operations
///
/// Uniqueness violations surface as `AppError::Conflict`; every other storage
/// failure as `AppError::Database`.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // ============== User Operations ==============

    async fn create_user(&self, user: &User) -> Result<()>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list_users(&self, page: Page) -> Result<Vec<UserSummary>>;

    /// Returns `false` if no user has this id.
    async fn set_user_profile_picture(&self, id: &str, url: &str) -> Result<bool>;

    // ============== Animal Operations ==============

    async fn create_animal(&self, animal: &Animal) -> Result<()>;

    async fn list_animals(&self, page: Page) -> Result<Vec<Animal>>;

    /// Returns `false` if no animal has this id.
    async fn set_animal_profile_picture(&self, id: &str, url: &str) -> Result<bool>;

    // ============== Training Log Operations ==============

    async fn create_training_log(&self, log: &TrainingLog) -> Result<()>;

    async fn list_training_logs(&self, page: Page) -> Result<Vec<TrainingLog>>;

    /// Returns `false` if no training log has this id.
    async fn set_training_log_video(&self, id: &str, url: &str) -> Result<bool>;

    // ============== Maintenance ==============

    /// Delete every user, animal and training log.
    async fn clear_all(&self) -> Result<()>;
}

// ============== Implement DatabaseClient for TursoClient ==============

#[async_trait]
impl DatabaseClient for super::turso::TursoClient {
    async fn create_user(&self, user: &User) -> Result<()> {
        super::turso::TursoClient::create_user(self, user).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        super::turso::TursoClient::get_user_by_email(self, email).await
    }

    async fn list_users(&self, page: Page) -> Result<Vec<UserSummary>> {
        super::turso::TursoClient::list_users(self, page).await
    }

    async fn set_user_profile_picture(&self, id: &str, url: &str) -> Result<bool> {
        super::turso::TursoClient::set_user_profile_picture(self, id, url).await
    }

    async fn create_animal(&self, animal: &Animal) -> Result<()> {
        super::turso::TursoClient::create_animal(self, animal).await
    }

    async fn list_animals(&self, page: Page) -> Result<Vec<Animal>> {
        super::turso::TursoClient::list_animals(self, page).await
    }

    async fn set_animal_profile_picture(&self, id: &str, url: &str) -> Result<bool> {
        super::turso::TursoClient::set_animal_profile_picture(self, id, url).await
    }

    async fn create_training_log(&self, log: &TrainingLog) -> Result<()> {
        super::turso::TursoClient::create_training_log(self, log).await
    }

    async fn list_training_logs(&self, page: Page) -> Result<Vec<TrainingLog>> {
        super::turso::TursoClient::list_training_logs(self, page).await
    }

    async fn set_training_log_video(&self, id: &str, url: &str) -> Result<bool> {
        super::turso::TursoClient::set_training_log_video(self, id, url).await
    }

    async fn clear_all(&self) -> Result<()> {
        super::turso::TursoClient::clear_all(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_url_selects_memory_provider() {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
            turso_url_env: None,
            turso_token_env: None,
        };
        assert_eq!(DatabaseProvider::from_config(&config), DatabaseProvider::Memory);
    }

    #[test]
    fn test_file_url_selects_sqlite_provider() {
        let config = DatabaseConfig {
            url: "./data/trainlog.db".to_string(),
            turso_url_env: None,
            turso_token_env: None,
        };
        assert_eq!(
            DatabaseProvider::from_config(&config),
            DatabaseProvider::SQLite {
                path: "./data/trainlog.db".to_string()
            }
        );
    }

    #[test]
    fn test_unset_turso_env_falls_back_to_file() {
        let config = DatabaseConfig {
            url: "./data/trainlog.db".to_string(),
            turso_url_env: Some("TRAINLOG_TEST_UNSET_TURSO_URL".to_string()),
            turso_token_env: Some("TRAINLOG_TEST_UNSET_TURSO_TOKEN".to_string()),
        };
        assert!(matches!(
            DatabaseProvider::from_config(&config),
            DatabaseProvider::SQLite { .. }
        ));
    }

    #[tokio::test]
    async fn test_memory_provider_creates_client() {
        let client = DatabaseProvider::Memory
            .create_client()
            .await
            .expect("should create client");
        let users = client.list_users(Page::default()).await.expect("should list");
        assert!(users.is_empty());
    }
}
