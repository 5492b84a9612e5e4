pub mod config;
pub mod octet;
