extern crate diesel;

mod api;
mod digest;
mod email;
mod errors;
mod models;
mod news;
mod observability;
mod schema;
mod security;
mod session;
mod tasks;
#[cfg(test)]
mod test_helpers;
mod types;

use crate::api::cron::types::CronSettings;
use crate::digest::DigestConfig;
use crate::email::{EmailGateway, SmtpGateway};
use crate::news::client::NewsApiClient;
use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use diesel::{
    prelude::*,
    r2d2::{self},
};
use diesel_migrations::MigrationHarness;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/migrations");

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run one digest check and exit
    #[clap(long)]
    run_check: bool,

    /// Hour to evaluate with --run-check, instead of the current hour
    #[clap(long)]
    hour: Option<u32>,
}

fn main() -> std::io::Result<()> {
    dotenv().ok();

    observability::init_logging();

    let config = load_config();

    let db_pool = initialize_db_pool(config.db_path);
    tracing::info!("Running database migrations");
    let mut conn = db_pool.get().expect("Failed to get database connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let digest_config = DigestConfig::from_env();
    let news = Arc::new(NewsApiClient::from_env().expect("News API configuration is incomplete"));
    let gateway: Arc<dyn EmailGateway> =
        Arc::new(SmtpGateway::from_env().expect("SMTP configuration is incomplete"));

    let args = Args::parse();
    if args.run_check {
        if let Some(hour) = args.hour {
            if hour > 23 {
                eprintln!("--hour must be between 0 and 23");
                std::process::exit(2);
            }
        }
        return run_one_check(db_pool, news, gateway, digest_config, args.hour);
    }

    run_server(db_pool, config.port, news, gateway, digest_config)
}

#[actix_web::main]
async fn run_one_check(
    db_pool: DbPool,
    news: Arc<NewsApiClient>,
    gateway: Arc<dyn EmailGateway>,
    digest_config: DigestConfig,
    hour: Option<u32>,
) -> std::io::Result<()> {
    let result = tasks::digest_scheduler::runner::run_check(
        &db_pool,
        &news,
        gateway.as_ref(),
        &digest_config,
        hour,
    )
    .await;

    match result {
        Ok(summary) => {
            println!(
                "Checked {} subscribers at hour {}: {} due, {} sent, {} failed",
                summary.checked, summary.hour, summary.due, summary.sent, summary.failed
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Digest check failed: {}", e);
            std::process::exit(1);
        }
    }
}

struct AppConfig {
    db_path: String,
    port: u16,
}

fn load_config() -> AppConfig {
    let db_path = match env::var("ND_DATABASE_URL") {
        Ok(path) => {
            log::info!("Using database path from ND_DATABASE_URL: {}", path);
            path
        }
        Err(_) => {
            let mut path = env::current_dir().expect("Failed to get current directory");
            path.push("newsdigest.db");
            let res = path.to_str().unwrap().to_string();
            log::info!("Using default database path: {}", res);
            res
        }
    };
    let port = match env::var("ND_PORT") {
        Ok(port) => {
            log::info!("Using port from ND_PORT: {}", port);
            port.parse::<u16>().expect("Failed to parse ND_PORT")
        }
        Err(_) => {
            log::info!("Using default port: 8080");
            8080
        }
    };

    AppConfig { db_path, port }
}

#[actix_web::main]
async fn run_server(
    db_pool: DbPool,
    port: u16,
    news: Arc<NewsApiClient>,
    gateway: Arc<dyn EmailGateway>,
    digest_config: DigestConfig,
) -> std::io::Result<()> {
    tracing::info!("Starting server at http://127.0.0.1:{}", port);

    tokio::spawn(tasks::digest_scheduler::runner::start(
        db_pool.clone(),
        news.clone(),
        gateway.clone(),
        digest_config.clone(),
    ));

    let cron_settings = CronSettings::from_env();
    let news_data = web::Data::from(news);
    let gateway_data: web::Data<dyn EmailGateway> = web::Data::from(gateway);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        // Create rate limiters
        let general_rate_limiter = security::create_rate_limiter();
        let strict_rate_limiter = security::create_auth_rate_limiter();

        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .wrap(security::SecurityHeaders) // Add security headers
            .wrap(cors)
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(news_data.clone())
            .app_data(gateway_data.clone())
            .app_data(web::Data::new(digest_config.clone()))
            .app_data(web::Data::new(cron_settings.clone()))
            .service(
                web::scope("/api/auth")
                    .wrap(Governor::new(&strict_rate_limiter)) // Strict rate limiting for auth
                    .service(api::auth::handlers::register)
                    .service(api::auth::handlers::login)
                    .service(api::auth::handlers::logout),
            )
            .service(
                web::scope("/api/digest")
                    .wrap(Governor::new(&strict_rate_limiter)) // Manual sends are expensive
                    .service(api::digest::handlers::send_now),
            )
            .service(api::health::routes()) // Health checks (no rate limiting)
            .service(
                web::scope("/api")
                    .wrap(Governor::new(&general_rate_limiter)) // General rate limiting for non-auth endpoints
                    .service(api::users::routes())
                    .service(api::news::routes())
                    .service(api::cron::routes()),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

type DbPool = r2d2::Pool<r2d2::ConnectionManager<SqliteConnection>>;
pub type RqDbPool = web::Data<DbPool>;
fn initialize_db_pool(db_path: String) -> DbPool {
    dotenv().ok();

    let manager = r2d2::ConnectionManager::<SqliteConnection>::new(db_path);
    r2d2::Pool::builder()
        .build(manager)
        .expect("Database URL should be a valid path to SQLite DB file")
}
