pub mod app;
pub mod config;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod state;
pub mod storage;
pub mod store;
pub mod theme;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::Storage;
pub use tracker::Tracker;
