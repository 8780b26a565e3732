/// Cadence Server - music catalog REST backend
use cadence_cache::{Cache, MemoryCache, RedisCache};
use cadence_core::CreateUser;
use cadence_server::{
    api::auth::mask_email,
    config::{CacheBackend, ServerConfig},
    create_router,
    services::{AuthService, MediaStorage},
    state::AppState,
};
use cadence_storage::{admins, sessions, users, Database};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-server")]
#[command(about = "Cadence music catalog server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address used to log in
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Grant admin privileges to an existing user
    Promote {
        /// Email of the user to promote
        #[arg(short, long)]
        email: String,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ServerConfig::load_from(Path::new(path))?,
        None => ServerConfig::load()?,
    };

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            email,
            password,
        } => add_user(&config, username, email, password).await?,
        Commands::Promote { email } => promote(&config, &email).await?,
        Commands::ListUsers => list_users(&config).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Cadence Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Media first: it creates the data directory the database lives in
    let media = MediaStorage::new(
        config.storage.upload_dir.clone(),
        config.storage.max_image_bytes,
        config.storage.max_audio_bytes,
    );
    media.initialize().await?;
    let media = Arc::new(media);
    tracing::info!("Media storage initialized");

    let db = Arc::new(Database::new(&config.storage.database_url).await?);
    tracing::info!("Database connected");

    let purged = sessions::purge_expired(db.pool()).await?;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
        config.auth.bcrypt_cost,
    ));
    tracing::info!("Auth service initialized");

    let cache: Arc<dyn Cache> = match config.cache.backend {
        CacheBackend::Redis => {
            let cache = RedisCache::connect(&config.cache.redis_url).await?;
            tracing::info!("Redis cache connected");
            Arc::new(cache)
        }
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache");
            Arc::new(MemoryCache::new())
        }
    };

    let app_state = AppState::new(
        db,
        auth_service,
        media,
        cache,
        config.cache.default_ttl(),
    )
    .with_secure_cookies(config.auth.secure_cookies);

    let app = create_router(app_state, &config.server.cors_origins);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(
    config: &ServerConfig,
    username: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    cadence_core::validation::validate_username(&username)?;

    let db = Database::new(&config.storage.database_url).await?;
    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
        config.auth.bcrypt_cost,
    );

    let password_hash = auth_service.hash_password_blocking(password).await?;
    let user = users::create(
        db.pool(),
        CreateUser {
            username,
            email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Created user {} ({})", user.username, mask_email(&user.email));
    println!("Created user {} with id {}", user.username, user.id);

    Ok(())
}

async fn promote(config: &ServerConfig, email: &str) -> anyhow::Result<()> {
    let db = Database::new(&config.storage.database_url).await?;

    let user = users::find_by_email(db.pool(), email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with email {}", mask_email(email)))?;

    if admins::is_admin(db.pool(), &user.id).await? {
        println!("{} is already an admin", user.username);
        return Ok(());
    }

    admins::grant(db.pool(), &user.id).await?;
    tracing::info!(user_id = %user.id, "Granted admin privileges");
    println!("{} is now an admin", user.username);

    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let db = Database::new(&config.storage.database_url).await?;
    let all = users::get_all(db.pool()).await?;
    let admin_ids: Vec<_> = admins::get_all(db.pool())
        .await?
        .into_iter()
        .map(|a| a.user_id)
        .collect();

    println!("Users:");
    for user in all {
        let role = if admin_ids.contains(&user.id) { " (admin)" } else { "" };
        println!("  {} - {} <{}>{}", user.id, user.username, user.email, role);
    }

    Ok(())
}
