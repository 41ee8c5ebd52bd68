//! 候选人过滤：一人最多持有一张卡，群组不能以自己为父群组。

use crate::error::AppError;
use crate::models::{Card, CardId, Group, GroupId, User, UserId};

/// 可以被分配到卡上的用户。
///
/// 已持有其他卡的用户被排除；编辑已有卡时，卡的当前持有人仍可选。
/// 结果保持 `users` 的原有顺序。
pub fn eligible_card_owners<'a>(
    users: &'a [User],
    cards: &[Card],
    editing: Option<&Card>,
) -> Vec<&'a User> {
    let editing_id = editing.map(|card| card.id);
    let current_owner = editing.and_then(|card| card.user_id);

    users
        .iter()
        .filter(|user| {
            Some(user.id) == current_owner
                || !owns_other_card(cards, user.id, editing_id)
        })
        .collect()
}

/// 把 `user_id` 分配给卡 `card_id` 之前的检查
pub fn ensure_card_owner_eligible(
    user_id: UserId,
    cards: &[Card],
    card_id: Option<CardId>,
) -> Result<(), AppError> {
    if owns_other_card(cards, user_id, card_id) {
        tracing::warn!("User {} already owns another card", user_id);
        return Err(AppError::validation("user_id", "该用户已持有其他卡片"));
    }
    Ok(())
}

fn owns_other_card(cards: &[Card], user_id: UserId, except: Option<CardId>) -> bool {
    cards
        .iter()
        .any(|card| Some(card.id) != except && card.is_owned_by(user_id))
}

/// 可作为父群组的候选项，排除正在编辑的群组本身
pub fn parent_group_candidates(groups: &[Group], editing: Option<GroupId>) -> Vec<&Group> {
    groups
        .iter()
        .filter(|group| Some(group.id) != editing)
        .collect()
}

pub fn ensure_valid_parent(group_id: GroupId, parent_id: Option<GroupId>) -> Result<(), AppError> {
    if parent_id == Some(group_id) {
        return Err(AppError::validation("parent_id", "群组不能成为自己的父群组"));
    }
    Ok(())
}
