pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod forms;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod page_state;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod ui;
pub mod validation;

pub use app::router;
pub use config::PortalConfig;
pub use gate::SessionGate;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
