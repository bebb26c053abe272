pub mod crypto;

pub use crypto::{TokenHasher, TokenHasherError};
