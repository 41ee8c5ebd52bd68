use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Card, CardId, User, UserId};

#[derive(Debug, Deserialize)]
pub struct EligibleOwnersQuery {
    /// 为空表示新建卡片
    pub card_id: Option<CardId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerCandidate {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub current_owner: bool,
}

impl OwnerCandidate {
    pub fn new(user: &User, owner: Option<UserId>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            current_owner: owner == Some(user.id),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignOwnerRequest {
    /// `null` 表示收回卡片
    pub user_id: Option<UserId>,
}

/// 更新后的卡片，附带此刻能否刷卡
#[derive(Debug, Serialize)]
pub struct AssignedCard {
    #[serde(flatten)]
    pub card: Card,
    pub active: bool,
}

impl AssignedCard {
    pub fn new(card: Card, now: DateTime<Utc>) -> Self {
        let active = card.is_active(now);
        Self { card, active }
    }
}
