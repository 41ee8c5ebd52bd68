//! 用户群组成员与房间授权的变更计划。
//!
//! 差分本身由 [`reconcile`] 完成，这里负责把差分翻译成后端操作：
//! 群组成员移除是硬删除，房间授权移除是撤销（保留历史记录）。

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;

use crate::models::{GroupId, Permission, PermissionId, RoomId, User, UserId};
use crate::reconcile::{Diff, reconcile};

/// 某个用户当前分配状态的只读快照，每次请求从后端重新拉取
#[derive(Debug, Clone)]
pub struct AssignmentSnapshot {
    pub user_id: UserId,
    pub groups: Vec<GroupId>,
    pub permissions: Vec<Permission>,
}

impl AssignmentSnapshot {
    /// 新建用户还没有任何分配
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            groups: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn from_user(user: &User, permissions: Vec<Permission>) -> Self {
        Self {
            user_id: user.id,
            groups: user.groups.iter().map(|group| group.id).collect(),
            permissions,
        }
    }

    fn active_permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions
            .iter()
            .filter(move |perm| perm.active && perm.user_id == Some(self.user_id))
    }

    /// 已撤销的授权只是历史，不算当前集合
    pub fn current_rooms(&self) -> BTreeSet<RoomId> {
        self.active_permissions().map(|perm| perm.room_id).collect()
    }

    /// 仍在当前集合里、但此刻没有任何一条授权生效的房间（已过期或尚未开始）
    pub fn lapsed_rooms(&self, now: DateTime<Utc>) -> BTreeSet<RoomId> {
        let effective: BTreeSet<RoomId> = self
            .active_permissions()
            .filter(|perm| perm.is_valid(now))
            .map(|perm| perm.room_id)
            .collect();
        self.current_rooms()
            .into_iter()
            .filter(|room| !effective.contains(room))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    AddMembership,
    DeleteMembership,
    GrantPermission,
    RevokePermission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    AddMembership {
        group_id: GroupId,
        user_id: UserId,
    },
    RemoveMembership {
        group_id: GroupId,
        user_id: UserId,
    },
    GrantPermission {
        user_id: UserId,
        room_id: RoomId,
        granted_by: UserId,
        valid_from: DateTime<Utc>,
    },
    RevokePermission {
        permission_id: PermissionId,
        room_id: RoomId,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::AddMembership { .. } => OperationKind::AddMembership,
            Operation::RemoveMembership { .. } => OperationKind::DeleteMembership,
            Operation::GrantPermission { .. } => OperationKind::GrantPermission,
            Operation::RevokePermission { .. } => OperationKind::RevokePermission,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::RemoveMembership { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    /// 后端接口路径，不含 base url
    pub fn path(&self) -> String {
        match self {
            Operation::AddMembership { group_id, .. } => {
                format!("/api/groups/{}/users", group_id)
            }
            Operation::RemoveMembership { group_id, user_id } => {
                format!("/api/groups/{}/users/{}", group_id, user_id)
            }
            Operation::GrantPermission { .. } => "/api/permissions".to_string(),
            Operation::RevokePermission { permission_id, .. } => {
                format!("/api/permissions/{}/revoke", permission_id)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentPlan {
    pub user_id: UserId,
    pub groups: Diff<GroupId>,
    pub rooms: Diff<RoomId>,
    /// 保留下来但授权已失效的房间，计划不会替它们重新授权
    pub lapsed_rooms: Vec<RoomId>,
    pub operations: Vec<Operation>,
}

impl AssignmentPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// 对比快照与表单勾选结果，生成需要执行的操作。
///
/// 操作顺序为：删除成员、撤销授权、添加成员、新增授权。各操作互相独立，
/// 调用方可以并发执行。某个房间若仍有有效授权，不会再重复授权。
pub fn plan_user_assignments<G, R>(
    snapshot: &AssignmentSnapshot,
    desired_groups: G,
    desired_rooms: R,
    granted_by: UserId,
    now: DateTime<Utc>,
) -> AssignmentPlan
where
    G: IntoIterator<Item = GroupId>,
    R: IntoIterator<Item = RoomId>,
{
    let user_id = snapshot.user_id;
    let groups = reconcile(snapshot.groups.iter().copied(), desired_groups);
    let rooms = reconcile(snapshot.current_rooms(), desired_rooms);

    let mut operations = Vec::with_capacity(
        groups.to_add.len() + groups.to_remove.len() + rooms.to_add.len() + rooms.to_remove.len(),
    );

    operations.extend(
        groups
            .to_remove
            .iter()
            .map(|&group_id| Operation::RemoveMembership { group_id, user_id }),
    );

    // 同一房间可能残留多条有效授权，全部撤销
    let mut revokes: Vec<&Permission> = snapshot
        .active_permissions()
        .filter(|perm| rooms.to_remove.binary_search(&perm.room_id).is_ok())
        .collect();
    revokes.sort_by_key(|perm| (perm.room_id, perm.id));
    operations.extend(revokes.into_iter().map(|perm| Operation::RevokePermission {
        permission_id: perm.id,
        room_id: perm.room_id,
    }));

    operations.extend(
        groups
            .to_add
            .iter()
            .map(|&group_id| Operation::AddMembership { group_id, user_id }),
    );
    operations.extend(rooms.to_add.iter().map(|&room_id| Operation::GrantPermission {
        user_id,
        room_id,
        granted_by,
        valid_from: now,
    }));

    let lapsed_rooms: Vec<RoomId> = snapshot
        .lapsed_rooms(now)
        .into_iter()
        .filter(|room| rooms.to_remove.binary_search(room).is_err())
        .collect();
    if !lapsed_rooms.is_empty() {
        tracing::warn!(
            "User {} keeps rooms {:?} whose permissions are not in effect",
            user_id,
            lapsed_rooms
        );
    }

    tracing::debug!(
        "Planned {} operation(s) for user {}: groups +{} -{}, rooms +{} -{}",
        operations.len(),
        user_id,
        groups.to_add.len(),
        groups.to_remove.len(),
        rooms.to_add.len(),
        rooms.to_remove.len()
    );

    AssignmentPlan {
        user_id,
        groups,
        rooms,
        lapsed_rooms,
        operations,
    }
}
