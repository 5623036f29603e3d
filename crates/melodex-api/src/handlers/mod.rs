pub mod admin;
pub mod auth;
pub mod creator;
pub mod download;
pub mod health;
pub mod tracks;
pub mod users;
