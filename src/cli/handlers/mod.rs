pub mod build;
pub mod config;
pub mod info;
pub mod inspect;
pub mod lookup;
