use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod jwt;
mod middleware;
mod models;
mod policy;
mod rate_limiter;
mod repositories;
mod routes;
mod state;
mod validation;

use common::cache::{RedisConfig, RedisPool};
use common::database::{DatabaseConfig, health_check, init_pool};

use crate::{
    jwt::{JwtConfig, JwtService},
    policy::AdminSeed,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        LogHistoryRepository, ProfileRepository, RoleRepository, TicketRepository, UserRepository,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting helpdesk service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config)?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let admin_seed = AdminSeed::from_env();
    info!("Ticket-admin seed usernames: {:?}", admin_seed.usernames());

    let app_state = AppState {
        db_pool: pool.clone(),
        redis_pool,
        jwt_service,
        user_repository: UserRepository::new(pool.clone()),
        profile_repository: ProfileRepository::new(pool.clone()),
        ticket_repository: TicketRepository::new(pool.clone()),
        log_repository: LogHistoryRepository::new(pool.clone()),
        role_repository: RoleRepository::new(pool),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        admin_seed,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Helpdesk service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
