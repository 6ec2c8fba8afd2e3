pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod router;
pub mod storage;
pub mod views;

pub use app::App;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
