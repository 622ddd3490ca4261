mod client;
pub mod model;
mod token;

pub use client::AmadeusClient;
pub use token::{ClientCredentialsGrant, IssuedToken, TokenGrant, TokenProvider};
