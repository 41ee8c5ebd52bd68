mod handler;

pub use handler::create_room;
