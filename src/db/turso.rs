use crate::types::{AppError, Animal, Page, Result, TrainingLog, User, UserSummary};
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row, Value};
use std::path::Path;
use tracing::info;

/// libsql-backed document store for users, animals and training logs.
///
/// One connection is opened at startup and shared by every request; libsql
/// serializes access internally.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Ephemeral in-memory database (tests, demos).
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::from_database(db).await
    }

    /// SQLite file on local disk. The parent directory is created if needed.
    pub async fn new_local(path: &str) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    /// Remote Turso database.
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                profile_picture TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // owner, animal_id and user_id are plain ids, not foreign keys
        conn.execute(
            "CREATE TABLE IF NOT EXISTS animals (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                hours_trained REAL NOT NULL DEFAULT 0,
                owner TEXT NOT NULL,
                date_of_birth TEXT,
                profile_picture TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create animals table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS training_logs (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                hours REAL NOT NULL,
                animal_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                training_log_video TEXT,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create training_logs table: {}", e)))?;

        Ok(())
    }

    // User operations
    pub async fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, profile_picture, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                user.id.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.email.as_str(),
                user.password_hash.as_str(),
                user.profile_picture.as_deref(),
                now,
            ),
        )
        .await
        .map_err(|e| write_error("Failed to create user", e))?;

        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, first_name, last_name, email, password_hash, profile_picture
                 FROM users WHERE email = ?",
                [email],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(User {
                id: text(&row, 0)?,
                first_name: text(&row, 1)?,
                last_name: text(&row, 2)?,
                email: text(&row, 3)?,
                password_hash: text(&row, 4)?,
                profile_picture: optional_text(&row, 5)?,
            })),
            None => Ok(None),
        }
    }

    pub async fn list_users(&self, page: Page) -> Result<Vec<UserSummary>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, first_name, last_name, email, profile_picture
                 FROM users ORDER BY created_at, rowid LIMIT ? OFFSET ?",
                (page.count as i64, page.offset as i64),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            users.push(UserSummary {
                id: text(&row, 0)?,
                first_name: text(&row, 1)?,
                last_name: text(&row, 2)?,
                email: text(&row, 3)?,
                profile_picture: optional_text(&row, 4)?,
            });
        }

        Ok(users)
    }

    pub async fn set_user_profile_picture(&self, id: &str, url: &str) -> Result<bool> {
        self.set_column("users", "profile_picture", id, url).await
    }

    // Animal operations
    pub async fn create_animal(&self, animal: &Animal) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO animals (id, name, hours_trained, owner, date_of_birth, profile_picture, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                animal.id.as_str(),
                animal.name.as_str(),
                animal.hours_trained,
                animal.owner.as_str(),
                animal.date_of_birth.map(|d| d.to_rfc3339()),
                animal.profile_picture.as_deref(),
                now,
            ),
        )
        .await
        .map_err(|e| write_error("Failed to create animal", e))?;

        Ok(())
    }

    pub async fn list_animals(&self, page: Page) -> Result<Vec<Animal>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, name, hours_trained, owner, date_of_birth, profile_picture
                 FROM animals ORDER BY created_at, rowid LIMIT ? OFFSET ?",
                (page.count as i64, page.offset as i64),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list animals: {}", e)))?;

        let mut animals = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            animals.push(Animal {
                id: text(&row, 0)?,
                name: text(&row, 1)?,
                hours_trained: real(&row, 2)?,
                owner: text(&row, 3)?,
                date_of_birth: optional_text(&row, 4)?
                    .map(|s| parse_timestamp(&s))
                    .transpose()?,
                profile_picture: optional_text(&row, 5)?,
            });
        }

        Ok(animals)
    }

    pub async fn set_animal_profile_picture(&self, id: &str, url: &str) -> Result<bool> {
        self.set_column("animals", "profile_picture", id, url).await
    }

    // Training log operations
    pub async fn create_training_log(&self, log: &TrainingLog) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO training_logs
             (id, date, description, hours, animal_id, user_id, training_log_video, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                log.id.as_str(),
                log.date.to_rfc3339(),
                log.description.as_str(),
                log.hours,
                log.animal.as_str(),
                log.user.as_str(),
                log.training_log_video.as_deref(),
                now,
            ),
        )
        .await
        .map_err(|e| write_error("Failed to create training log", e))?;

        Ok(())
    }

    pub async fn list_training_logs(&self, page: Page) -> Result<Vec<TrainingLog>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, date, description, hours, animal_id, user_id, training_log_video
                 FROM training_logs ORDER BY created_at, rowid LIMIT ? OFFSET ?",
                (page.count as i64, page.offset as i64),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list training logs: {}", e)))?;

        let mut logs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            logs.push(TrainingLog {
                id: text(&row, 0)?,
                date: parse_timestamp(&text(&row, 1)?)?,
                description: text(&row, 2)?,
                hours: real(&row, 3)?,
                animal: text(&row, 4)?,
                user: text(&row, 5)?,
                training_log_video: optional_text(&row, 6)?,
            });
        }

        Ok(logs)
    }

    pub async fn set_training_log_video(&self, id: &str, url: &str) -> Result<bool> {
        self.set_column("training_logs", "training_log_video", id, url).await
    }

    /// Updates one column of one row; `false` if no row has that id.
    async fn set_column(&self, table: &str, column: &str, id: &str, value: &str) -> Result<bool> {
        let conn = self.connection()?;
        let sql = format!("UPDATE {} SET {} = ? WHERE id = ?", table, column);

        let affected = conn
            .execute(&sql, [value, id])
            .await
            .map_err(|e| write_error(&format!("Failed to update {}.{}", table, column), e))?;

        Ok(affected > 0)
    }

    // Maintenance
    pub async fn clear_all(&self) -> Result<()> {
        let conn = self.connection()?;

        for table in ["users", "animals", "training_logs"] {
            conn.execute(&format!("DELETE FROM {}", table), ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to clear {}: {}", table, e)))?;
        }

        info!("Cleared users, animals and training_logs");
        Ok(())
    }
}

fn write_error(context: &str, e: libsql::Error) -> AppError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        AppError::Conflict(format!("{}: {}", context, message))
    } else {
        AppError::Database(format!("{}: {}", context, message))
    }
}

fn text(row: &Row, idx: i32) -> Result<String> {
    match row.get_value(idx).map_err(|e| AppError::Database(e.to_string()))? {
        Value::Text(s) => Ok(s),
        other => Err(AppError::Database(format!(
            "Expected text in column {}, found {:?}",
            idx, other
        ))),
    }
}

fn optional_text(row: &Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx).map_err(|e| AppError::Database(e.to_string()))? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(AppError::Database(format!(
            "Expected text in column {}, found {:?}",
            idx, other
        ))),
    }
}

fn real(row: &Row, idx: i32) -> Result<f64> {
    match row.get_value(idx).map_err(|e| AppError::Database(e.to_string()))? {
        Value::Real(n) => Ok(n),
        Value::Integer(n) => Ok(n as f64),
        other => Err(AppError::Database(format!(
            "Expected number in column {}, found {:?}",
            idx, other
        ))),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid stored timestamp {:?}: {}", s, e)))
}
