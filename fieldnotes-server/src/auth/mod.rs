pub mod middleware;

pub use middleware::{SessionToken, auth_middleware};
