pub mod error;
pub mod intervention;
pub mod routes;
pub mod state;

pub use state::AppState;
