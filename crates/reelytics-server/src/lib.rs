pub mod app;
pub mod error;
pub mod routes;
pub mod scheduler;
pub mod state;
