pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod request_tracing;
pub mod routes;
pub mod state;
pub mod today_activities_handlers;
pub mod upstream;

pub use config::Config;
pub use routes::app;
pub use state::AppState;
