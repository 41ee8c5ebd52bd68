mod handler;
mod model;

pub use handler::{assign_owner, eligible_owners};
pub use model::{AssignOwnerRequest, AssignedCard, EligibleOwnersQuery, OwnerCandidate};
