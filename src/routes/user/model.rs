use serde::{Deserialize, Serialize};

use crate::{
    assignment::AssignmentPlan,
    backend::{BatchReport, UserForm},
    models::{GroupId, RoomId, User},
};

/// 表单勾选的群组和房间，可能含重复 id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentRequest {
    #[serde(default)]
    pub groups: Vec<GroupId>,
    #[serde(default)]
    pub rooms: Vec<RoomId>,
}

/// 新建和编辑共用的用户表单，附带勾选的群组和房间
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRequest {
    #[serde(flatten)]
    pub user: UserForm,
    #[serde(flatten)]
    pub assignments: AssignmentRequest,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
    pub plan: AssignmentPlan,
    pub report: BatchReport,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub plan: AssignmentPlan,
    pub report: BatchReport,
}
