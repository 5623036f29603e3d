//! Application state shared by all handlers

use melodex_core::Config;
use melodex_db::{TrackRepository, UserRepository};
use melodex_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::JwtService;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub tracks: TrackRepository,
    pub storage: Arc<dyn Storage>,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tracks: TrackRepository::new(pool.clone()),
            jwt: JwtService::new(&config.jwt_secret, config.jwt_expiry_hours),
            config,
            pool,
            storage,
        }
    }
}
