pub mod cancel;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod post_office;
pub mod query;
pub mod render;
pub mod session;
