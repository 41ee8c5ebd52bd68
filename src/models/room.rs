use serde::{Deserialize, Serialize};

use super::{AccessLevel, RoomId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub building: String,
    pub room_number: String,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub capacity: u32,
    /// 格式 `HH:MM-HH:MM`，为空表示全天开放
    #[serde(default)]
    pub operating_hours: String,
    /// 星期数字串，周日为 `0`
    #[serde(default)]
    pub operating_days: String,
}
