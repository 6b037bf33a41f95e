#[macro_use]
extern crate rocket;

use error::BackendError;
use mongodb::Client;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, StoreKind};
use crate::error::ConfigurationError;
use crate::route::mount_api;
use crate::store::Backend;

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod route;
pub mod schedule;
pub mod store;
pub mod util;

async fn connect(c: &Config) -> Result<Backend, BackendError> {
    match c.store {
        StoreKind::MongoDb => {
            tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
            let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

            tracing::info!("Using MongoDB database: {}", c.mongodb_db);
            let db = client.database(c.mongodb_db.as_str());

            if let Err(err) = db.list_collection_names(None).await {
                tracing::error!("Unable to connect to MongoDB: {}", err);
                return Err(err.into());
            }

            if c.unique_indexes {
                store::mongo::ensure_indexes(&db).await?;
            }

            Ok(Backend::Mongo(db))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; records won't survive a restart.");
            Ok(Backend::memory())
        }
    }
}

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            tracing::warn!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    let backend = connect(&c).await?;
    build(c, backend)
}

/// Assembles the server around an already connected store.
pub fn build(c: Config, backend: Backend) -> Result<Rocket<Build>, BackendError> {
    tracing::info!("Starting HTTP server...");
    let mut r = rocket::build().manage(c).manage(backend);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r).register("/", resp::problem::catchers::all());

    Ok(r)
}
