mod card;
mod group;
mod permission;
mod room;
mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use card::{Card, CardStatus};
pub use group::{AccessLevel, Group};
pub use permission::Permission;
pub use room::Room;
pub use user::User;

// 后端的主键都是无符号整数，这里包一层避免不同实体的 id 混用
macro_rules! entity_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl From<u64> for $name {
                fn from(value: u64) -> Self {
                    Self(value)
                }
            }
        )*
    };
}

entity_id!(UserId, CardId, GroupId, RoomId, PermissionId);
