use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trainlog::{
    api::routes::create_router,
    cli::{
        init::{self, InitConfig, InitResult},
        maintenance::{self, SeedCounts},
        output::Output,
        Cli, Commands,
    },
    utils::toml_config::{LogFormat, ServerConfig},
    AppState, CredentialHasher, DatabaseProvider, TrainlogConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &output,
            );
            if let InitResult::Error(e) = result {
                anyhow::bail!("init failed: {}", e);
            }
            Ok(())
        }
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::ClearDb { yes }) => {
            let config = load_config(&cli.config)?;
            init_tracing(&config.server, cli.verbose, true);

            let db = DatabaseProvider::from_config(&config.database)
                .create_client()
                .await
                .context("Failed to open database")?;
            maintenance::run_clear(db.as_ref(), yes, &output).await?;
            Ok(())
        }
        Some(Commands::Seed {
            users,
            animals,
            logs,
        }) => {
            let config = load_config(&cli.config)?;
            init_tracing(&config.server, cli.verbose, true);

            let password = &config.auth.password;
            let hasher = CredentialHasher::with_params(
                password.memory_kib,
                password.iterations,
                password.parallelism,
            )?;
            let db = DatabaseProvider::from_config(&config.database)
                .create_client()
                .await
                .context("Failed to open database")?;

            let counts = SeedCounts {
                users,
                animals,
                logs,
            };
            maintenance::run_seed(db.as_ref(), &hasher, counts, &output).await
        }
        None => serve(&cli.config, cli.verbose, &output).await,
    }
}

fn load_config(path: &Path) -> anyhow::Result<TrainlogConfig> {
    TrainlogConfig::load(path).with_context(|| {
        format!(
            "Failed to load {} (run `trainlog-server init` to create one)",
            path.display()
        )
    })
}

/// `RUST_LOG` wins over the configured level. Maintenance commands stay quiet
/// unless `--verbose` is given.
fn init_tracing(server: &ServerConfig, verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug".to_string()
    } else if quiet {
        "warn".to_string()
    } else {
        format!("{},tower_http=info", server.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn show_config(path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = load_config(path)?;

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("listen", &config.bind_address());
    output.kv("log", &format!("{} ({:?})", config.server.log_level, config.server.log_format));
    output.kv("database", &config.database.url);
    output.kv("storage", &format!("{:?} at {}", config.storage.backend, config.storage.root));
    output.kv("public url", &config.storage.public_url);
    output.kv("upload limit", &format!("{} bytes", config.storage.max_upload_bytes));
    output.kv(
        "token expiry",
        &config
            .auth
            .token_expiry_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "never".to_string()),
    );
    output.kv("public paths", &config.auth.public_paths.join(", "));

    if validate {
        output.subheader("Validation");
        config.validate()?;
        output.success("configuration is consistent");
        match config.jwt_secret() {
            Ok(_) => output.success(&format!("{} is set", config.auth.jwt_secret_env)),
            Err(e) => {
                output.error(&e.to_string());
                anyhow::bail!("configuration is not usable");
            }
        }
    }

    Ok(())
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    init_tracing(&config.server, verbose, false);
    output.banner();

    let addr = config.bind_address();
    let state = AppState::initialize(config).await?;
    if state.config.auth.token_expiry_secs.is_none() {
        warn!("auth.token_expiry_secs is unset; issued tokens never expire");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
