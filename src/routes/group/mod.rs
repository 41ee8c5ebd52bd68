mod handler;

pub use handler::{parent_candidates, update_group};
