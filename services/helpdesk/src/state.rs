//! Application state shared across handlers

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::{
    jwt::JwtService,
    policy::AdminSeed,
    rate_limiter::RateLimiter,
    repositories::{
        LogHistoryRepository, ProfileRepository, RoleRepository, TicketRepository, UserRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub profile_repository: ProfileRepository,
    pub ticket_repository: TicketRepository,
    pub log_repository: LogHistoryRepository,
    pub role_repository: RoleRepository,
    pub rate_limiter: RateLimiter,
    pub admin_seed: AdminSeed,
}
