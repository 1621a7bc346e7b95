pub mod aggregate;
pub mod config;
pub mod event;
pub mod recommend;
pub mod store;
pub mod video;
