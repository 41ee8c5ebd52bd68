use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CardId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Blocked,
    Revoked,
    Expired,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// RFID 卡号，全局唯一
    pub card_id: String,
    /// 未分配的卡没有持有人
    pub user_id: Option<UserId>,
    pub status: CardStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Card {
    /// 状态为 active 且未过期
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if self.status != CardStatus::Active {
            return false;
        }
        self.expiry_date.is_none_or(|expiry| now <= expiry)
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}
