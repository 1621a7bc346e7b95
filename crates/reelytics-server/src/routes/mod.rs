pub mod events;
pub mod health;
pub mod profiles;
pub mod recommendations;
pub mod trending;
pub mod videos;
