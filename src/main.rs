mod admission;
mod auth;
mod config;
mod error;
mod invitation;
mod lifecycle;
mod models;
mod notify;
mod registry;
mod routes;
mod seed;
mod store;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clap::{Parser, Subcommand};
use config::{Config, MailTransport};
use error::AppError;
use invitation::InvitationResolver;
use lifecycle::RsvpLifecycle;
use notify::{ConsoleMailer, Mailer, Notifier, SmtpMailer};
use registry::CategoryRegistry;
use sqlx::PgPool;
use store::{MemoryStore, PgStore, Store};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub registry: CategoryRegistry,
    pub invitations: InvitationResolver,
    pub rsvps: RsvpLifecycle,
}

impl AppState {
    pub fn new(config: Config, store: Store, mailer: Mailer) -> Self {
        let registry = CategoryRegistry::new(store.clone());
        let invitations = InvitationResolver::new(registry.clone());
        let rsvps = RsvpLifecycle::new(
            store.clone(),
            registry.clone(),
            invitations.clone(),
            Notifier::new(mailer),
        );

        Self {
            config: Arc::new(config),
            store,
            registry,
            invitations,
            rsvps,
        }
    }
}

#[derive(Parser)]
#[command(name = "rsvp-backend", about = "Wedding RSVP service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve {
        /// Keep everything in memory and seed on startup
        #[arg(long)]
        in_memory: bool,
    },
    /// Create both couple accounts and their starter categories
    Seed,
    /// Print an admin bearer token for the couple with this email
    Token { email: String },
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db = state.store.ping().await.is_ok();
    Json(serde_json::json!({ "status": "ok", "db": db }))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/healthz", get(health))
        .merge(routes::api_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn connect(config: &Config) -> Store {
    let db = PgPool::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!()
        .run(&db)
        .await
        .expect("failed to run migrations");

    Store::Postgres(PgStore::new(db))
}

fn build_mailer(config: &Config) -> Mailer {
    match config.mail_transport {
        MailTransport::Console => Mailer::Console(ConsoleMailer::new()),
        MailTransport::Smtp => Mailer::Smtp(
            SmtpMailer::new(&config.smtp, &config.mail_from_name, &config.mail_from_address)
                .expect("invalid SMTP configuration"),
        ),
    }
}

async fn serve(config: Config, in_memory: bool) -> Result<(), AppError> {
    let store = if in_memory {
        tracing::warn!("using in-memory store, data is lost on exit");
        Store::Memory(MemoryStore::new())
    } else {
        connect(&config).await
    };

    let mailer = build_mailer(&config);
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, store, mailer);

    if in_memory {
        let seeded = seed::run(&state.store, &state.registry, &state.config).await?;
        for couple in [&seeded.bride, &seeded.groom] {
            let token = auth::jwt::create_token(couple.id, couple.side, &state.config.jwt_secret)?;
            tracing::info!(email = %couple.email, side = %couple.side, %token, "admin token");
        }
    }

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind {addr}: {e}")))?;
    axum::serve(listener, app(state))
        .await
        .map_err(|e| AppError::Internal(format!("server error: {e}")))
}

async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    match cli.command.unwrap_or(Command::Serve { in_memory: false }) {
        Command::Serve { in_memory } => serve(config, in_memory).await,
        Command::Seed => {
            let store = connect(&config).await;
            let registry = CategoryRegistry::new(store.clone());
            seed::run(&store, &registry, &config).await?;
            Ok(())
        }
        Command::Token { email } => {
            let store = connect(&config).await;
            let couple = store
                .get_couple_by_email(&email)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No account for {email}")))?;
            let token = auth::jwt::create_token(couple.id, couple.side, &config.jwt_secret)?;
            println!("{token}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(cli, config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
