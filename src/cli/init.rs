//! Init command implementation
//!
//! Scaffolds a new project: configuration, environment template and the
//! data directories used by the default local backends.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    Success,
    /// trainlog.toml already exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    pub host: String,
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing trainlog project");

    let base_path = &config.path;
    let config_path = base_path.join("trainlog.toml");
    if config_path.exists() && !config.force {
        output.warning("trainlog.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating directories");
    for dir in ["data", "data/blobs"] {
        let dir_path = base_path.join(dir);
        if dir_path.exists() {
            output.skipped(dir, "already exists");
            continue;
        }
        if let Err(e) = fs::create_dir_all(&dir_path) {
            output.error(&format!("Failed to create {}: {}", dir, e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir(dir);
    }

    output.subheader("Creating configuration files");
    let files = [
        ("config", "trainlog.toml", generate_trainlog_toml(&config)),
        ("env", ".env.example", generate_env_example()),
    ];
    for (kind, name, content) in files {
        match write_file(&base_path.join(name), &content, config.force) {
            Ok(true) => output.created(kind, name),
            Ok(false) => output.skipped(name, "already exists"),
            Err(e) => {
                output.error(&format!("Failed to create {}: {}", name, e));
                return InitResult::Error(e.to_string());
            }
        }
    }

    // Never clobber an existing .gitignore, even with --force
    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        match write_file(&gitignore_path, &generate_gitignore(), false) {
            Ok(_) => output.created("file", ".gitignore"),
            Err(e) => output.warning(&format!("Failed to create .gitignore: {}", e)),
        }
    }

    output.complete("Project initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set JWT_SECRET (at least 32 characters)");
    output.newline();
    output.info("2. Optionally insert demo data:");
    output.command("trainlog-server seed");
    output.newline();
    output.info("3. Start the server:");
    output.command("trainlog-server");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("OpenAPI document at /api-docs/openapi.json; Swagger UI needs the 'swagger-ui' feature");

    InitResult::Success
}

/// Returns `false` if the file already existed and was left alone.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_trainlog_toml(config: &InitConfig) -> String {
    format!(
        r#"# Trainlog server configuration

[server]
host = "{host}"
port = {port}
log_level = "info"     # overridden by RUST_LOG
log_format = "pretty"  # or "json"

[auth]
# Environment variable holding the token signing secret
jwt_secret_env = "JWT_SECRET"
# Token lifetime in seconds; leave unset for tokens that never expire
# token_expiry_secs = 86400
public_paths = ["/api/user", "/api/health", "/api-docs", "/swagger-ui", "/files"]

[auth.password]
memory_kib = 19456
iterations = 2
parallelism = 1

[database]
url = "./data/trainlog.db"   # ":memory:" for an ephemeral database
# Remote Turso database, used when both variables are set
# turso_url_env = "TURSO_DATABASE_URL"
# turso_token_env = "TURSO_AUTH_TOKEN"

[storage]
backend = "local"            # or "memory"
root = "./data/blobs"
public_url = "http://{host}:{port}/files"
max_upload_bytes = 52428800
"#,
        host = config.host,
        port = config.port,
    )
}

fn generate_env_example() -> String {
    r#"# Trainlog environment variables
# Copy this file to .env and fill in the values.

# REQUIRED: token signing secret (at least 32 characters)
# Generate with: openssl rand -base64 32
JWT_SECRET=change-me-in-production-use-at-least-32-characters

# Optional: log filter (trace, debug, info, warn, error)
RUST_LOG=info,trainlog=debug

# Optional: remote Turso database
# TURSO_DATABASE_URL=libsql://your-db.turso.io
# TURSO_AUTH_TOKEN=your-token
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Trainlog data
/data/
*.db
*.db-journal

# Environment
.env
.env.local

# Rust
/target/
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::TrainlogConfig;
    use tempfile::TempDir;

    fn init_config(temp_dir: &TempDir, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }

    #[test]
    fn test_generated_toml_is_valid_config() {
        let dir = TempDir::new().expect("tempdir");
        let content = generate_trainlog_toml(&init_config(&dir, false));

        let config = TrainlogConfig::from_toml(&content).expect("should parse");
        config.validate().expect("should validate");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.public_url, "http://0.0.0.0:8080/files");
        assert_eq!(config, TrainlogConfig {
            server: config.server.clone(),
            storage: config.storage.clone(),
            ..TrainlogConfig::default()
        });
    }

    #[test]
    fn test_run_creates_files() {
        let dir = TempDir::new().expect("tempdir");
        let result = run(init_config(&dir, false), &Output::no_color());

        assert!(matches!(result, InitResult::Success));
        assert!(dir.path().join("trainlog.toml").is_file());
        assert!(dir.path().join(".env.example").is_file());
        assert!(dir.path().join(".gitignore").is_file());
        assert!(dir.path().join("data/blobs").is_dir());
    }

    #[test]
    fn test_existing_config_not_overwritten() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("trainlog.toml");
        fs::write(&path, "# mine").expect("write");

        let result = run(init_config(&dir, false), &Output::no_color());
        assert!(matches!(result, InitResult::AlreadyExists));
        assert_eq!(fs::read_to_string(&path).expect("read"), "# mine");
    }

    #[test]
    fn test_force_overwrites_config_but_not_gitignore() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("trainlog.toml"), "# mine").expect("write");
        fs::write(dir.path().join(".gitignore"), "custom").expect("write");

        let result = run(init_config(&dir, true), &Output::no_color());
        assert!(matches!(result, InitResult::Success));

        let toml = fs::read_to_string(dir.path().join("trainlog.toml")).expect("read");
        assert!(toml.contains("[storage]"));
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).expect("read"),
            "custom"
        );
    }

    #[test]
    fn test_write_file_reports_skip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".env.example");

        assert!(write_file(&path, "first", false).expect("write"));
        assert!(!write_file(&path, "second", false).expect("write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "first");
        assert!(write_file(&path, "third", true).expect("write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "third");
    }

    #[test]
    fn test_existing_env_example_kept_without_force() {
        let dir = TempDir::new().expect("tempdir");
        let env_path = dir.path().join(".env.example");
        fs::write(&env_path, "JWT_SECRET=mine").expect("write");

        let result = run(init_config(&dir, false), &Output::no_color());
        assert!(matches!(result, InitResult::Success));
        assert_eq!(fs::read_to_string(&env_path).expect("read"), "JWT_SECRET=mine");
        assert!(dir.path().join("trainlog.toml").is_file());
    }

    #[test]
    fn test_env_example_names_secret() {
        assert!(generate_env_example().contains("JWT_SECRET="));
    }
}
