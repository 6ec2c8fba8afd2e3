//! REST surface of the remote polling service.
//! `pipeline` owns credentials and the refresh protocol; the resource modules are thin typed wrappers.

pub mod admin;
pub mod models;
pub mod pipeline;
pub mod polls;

pub use admin::AdminApi;
pub use pipeline::{ApiClient, ApiRequest};
pub use polls::PollsApi;
