//! Melodex database layer
//!
//! `sqlx`-backed repositories over PostgreSQL. All queries are runtime
//! queries with bound parameters; multi-row writes (track + variants) go
//! through [`db::transaction::TransactionGuard`].

pub mod db;

pub use db::tracks::TrackRepository;
pub use db::transaction::TransactionGuard;
pub use db::users::UserRepository;
