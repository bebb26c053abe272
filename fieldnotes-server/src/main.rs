use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fieldnotes_config::{Config, ConfigLoad, ConfigLoader};
use fieldnotes_core::{
    DatabaseContext, MachineLookup, PoolSettings, SessionService,
    TokenHasher, UserDirectory,
};
use fieldnotes_model::{MachineCode, NewMachine, UserId, UserUpsert};
use fieldnotes_server::{AppState, create_app};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fieldnotes-server", version, about = "Fieldnotes maintenance API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Debug, Clone, Args)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT", global = true)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST", global = true)]
    host: Option<String>,

    /// Explicit path to fieldnotes.toml
    #[arg(long, env = "FIELDNOTES_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Start serving without applying pending migrations
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Sessions(SessionsCommand),
    #[command(subcommand)]
    Machines(MachinesCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// Create or refresh the local mirror of an identity-provider subject
    Upsert {
        #[arg(long)]
        external_id: String,
        #[arg(long)]
        full_name: String,
    },
}

#[derive(Debug, Subcommand)]
enum SessionsCommand {
    /// Mint a bearer token for a user and print it once
    Issue {
        #[arg(long)]
        user_id: i32,
    },
}

#[derive(Debug, Subcommand)]
enum MachinesCommand {
    /// Register a machine so its QR label resolves
    Register(RegisterMachineArgs),
}

#[derive(Debug, Args)]
struct RegisterMachineArgs {
    /// Identifier encoded in the machine's QR label
    #[arg(long)]
    code: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    /// Arrival date, `YYYY-MM-DD`
    #[arg(long)]
    arrived: NaiveDate,
    #[arg(long)]
    location: String,
    #[arg(long)]
    sub_location: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    let Some(command) = cli.command else {
        return run_server(config, &cli.serve).await;
    };

    let database = connect_database(&config).await?;
    match command {
        Command::Db(DbCommand::Migrate) => {
            database.postgres().migrate().await?;
            info!("database migrations applied");
        }
        Command::Users(UsersCommand::Upsert {
            external_id,
            full_name,
        }) => {
            let user = UserDirectory::new(&database.unit_of_work())
                .upsert(UserUpsert {
                    external_id,
                    full_name,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Sessions(SessionsCommand::Issue { user_id }) => {
            let hasher = TokenHasher::new(&config.auth.token_key)
                .context("failed to initialise session token hasher")?;
            let sessions = SessionService::new(
                &database.unit_of_work(),
                Arc::new(hasher),
                config.auth.session_ttl,
            )?;
            let issued = sessions.issue(UserId::new(user_id)).await?;
            info!(
                user = %issued.user.full_name,
                expires_at = %issued.session.expires_at,
                "session issued; the token is shown only once"
            );
            println!("{}", issued.token);
        }
        Command::Machines(MachinesCommand::Register(args)) => {
            let machine = MachineLookup::new(&database.unit_of_work())
                .register(NewMachine {
                    machine_code: MachineCode::parse(&args.code)?,
                    category: args.category,
                    brand: args.brand,
                    model: args.model,
                    arrived_date: args.arrived,
                    location: args.location,
                    sub_location: args.sub_location,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&machine)?);
        }
    }

    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(Arc::new(config))
}

async fn connect_database(config: &Config) -> anyhow::Result<DatabaseContext> {
    let Some(url) = config.database.primary_url.as_deref() else {
        error!(
            "DATABASE_URL or POSTGRES_HOST/POSTGRES_USER/POSTGRES_DATABASE must be provided"
        );
        return Err(anyhow!("No PostgreSQL connection configuration found"));
    };

    DatabaseContext::connect_postgres(
        url,
        PoolSettings {
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
        },
    )
    .await
    .context("failed to connect to PostgreSQL")
}

async fn run_server(config: Arc<Config>, args: &ServeArgs) -> anyhow::Result<()> {
    let database = connect_database(&config).await?;

    if args.skip_migrations {
        warn!("skipping database migrations at startup");
    } else {
        database
            .postgres()
            .migrate()
            .await
            .context("failed to apply database migrations")?;
    }

    let state = AppState::new(database.unit_of_work(), Arc::clone(&config))?
        .with_postgres(database.postgres());
    let app = create_app(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    let addr = listener.local_addr()?;

    info!(%addr, dev_mode = config.dev_mode, "fieldnotes server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
