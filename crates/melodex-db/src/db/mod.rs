pub mod tracks;
pub mod transaction;
pub mod users;
