pub mod app;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{HabitStore, StoreData, load_data};
