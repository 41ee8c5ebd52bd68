pub mod card;
pub mod group;
pub mod health;
pub mod room;
pub mod user;
