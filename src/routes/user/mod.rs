mod handler;
mod model;

pub use handler::{create_user, preview_assignments, update_assignments, update_user};
pub use model::{AssignmentRequest, AssignmentResponse, UserRequest, UserResponse};
