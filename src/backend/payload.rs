use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AccessLevel, CardStatus, GroupId, RoomId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // 编辑时留空表示不修改密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub building: String,
    pub room_number: String,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub operating_hours: String,
    #[serde(default)]
    pub operating_days: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<GroupId>,
    #[serde(default)]
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardUpdate {
    pub card_id: String,
    pub user_id: Option<UserId>,
    pub status: CardStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct MembershipBody {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub(super) struct GrantBody {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub granted_by: UserId,
    pub valid_from: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}
