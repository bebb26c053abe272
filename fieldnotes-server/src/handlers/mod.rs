pub mod auth;
pub mod health;
pub mod machines;
pub mod services;
pub mod spare_parts;
pub mod users;
