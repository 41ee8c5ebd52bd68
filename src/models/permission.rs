use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CardId, PermissionId, RoomId, UserId};

/// 用户对房间的直接授权。撤销只把 `active` 置为 false，记录保留
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub card_id: Option<CardId>,
    pub room_id: RoomId,
    pub granted_by: UserId,
    pub valid_from: DateTime<Utc>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Permission {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if !self.active || now < self.valid_from {
            return false;
        }
        // 既没有用户也没有卡片的授权不属于任何人
        if self.user_id.is_none() && self.card_id.is_none() {
            return false;
        }
        self.valid_until.is_none_or(|until| now <= until)
    }
}
