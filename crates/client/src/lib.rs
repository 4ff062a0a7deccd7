pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod guards;
pub mod logging;
pub mod navigation;
pub mod stores;

pub use context::AppContext;
pub use error::ApiError;
