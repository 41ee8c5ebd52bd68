//! 门禁后端的 REST 客户端。
//!
//! 每次调用都带上操作员转发过来的 bearer 凭据，服务本身不保存任何状态。

mod payload;

use futures_util::future::join_all;
use reqwest::{Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::assignment::{AssignmentPlan, AssignmentSnapshot, Operation};
use crate::error::AppError;
use crate::models::{Card, CardId, Group, GroupId, Permission, Room, User, UserId};

pub use payload::{CardUpdate, GroupForm, RoomForm, UserForm};
use payload::{ErrorBody, GrantBody, MembershipBody};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("后端请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("后端返回 {status}: {message}")]
    Status { status: u16, message: String },
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Transport(err) => err.status().map(|status| status.as_u16()),
        }
    }
}

/// 转发给后端的操作员凭据
#[derive(Debug, Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, credential: &Credential, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(credential.token())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        body: &B,
    ) -> Result<T, BackendError> {
        self.send(request.json(body)).await
    }

    /// 后端根路径不需要登录，只用来确认服务可达
    pub async fn ping(&self) -> Result<(), BackendError> {
        let response = self.http.get(format!("{}/", self.base_url)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn current_user(&self, credential: &Credential) -> Result<User, BackendError> {
        self.send(self.request(credential, Method::GET, "/api/auth/me"))
            .await
    }

    pub async fn user_with_groups(
        &self,
        credential: &Credential,
        user_id: UserId,
    ) -> Result<User, BackendError> {
        let path = format!("/api/users/{}?include_groups=true", user_id);
        self.send(self.request(credential, Method::GET, &path)).await
    }

    pub async fn user_permissions(
        &self,
        credential: &Credential,
        user_id: UserId,
    ) -> Result<Vec<Permission>, BackendError> {
        let path = format!("/api/permissions?user_id={}&type=user", user_id);
        self.send(self.request(credential, Method::GET, &path)).await
    }

    /// 并发拉取用户的群组与直接授权，组成本次请求使用的快照
    pub async fn snapshot(
        &self,
        credential: &Credential,
        user_id: UserId,
    ) -> Result<AssignmentSnapshot, BackendError> {
        let (user, permissions) = tokio::try_join!(
            self.user_with_groups(credential, user_id),
            self.user_permissions(credential, user_id),
        )?;
        Ok(AssignmentSnapshot::from_user(&user, permissions))
    }

    pub async fn list_users(&self, credential: &Credential) -> Result<Vec<User>, BackendError> {
        self.send(self.request(credential, Method::GET, "/api/users"))
            .await
    }

    pub async fn list_cards(&self, credential: &Credential) -> Result<Vec<Card>, BackendError> {
        self.send(self.request(credential, Method::GET, "/api/cards"))
            .await
    }

    pub async fn list_groups(&self, credential: &Credential) -> Result<Vec<Group>, BackendError> {
        self.send(self.request(credential, Method::GET, "/api/groups"))
            .await
    }

    pub async fn create_user(
        &self,
        credential: &Credential,
        form: &UserForm,
    ) -> Result<User, BackendError> {
        self.send_json(self.request(credential, Method::POST, "/api/users"), form)
            .await
    }

    /// 密码为空时后端保留原密码
    pub async fn update_user(
        &self,
        credential: &Credential,
        user_id: UserId,
        form: &UserForm,
    ) -> Result<User, BackendError> {
        let path = format!("/api/users/{}", user_id);
        self.send_json(self.request(credential, Method::PUT, &path), form)
            .await
    }

    pub async fn create_room(
        &self,
        credential: &Credential,
        form: &RoomForm,
    ) -> Result<Room, BackendError> {
        self.send_json(self.request(credential, Method::POST, "/api/rooms"), form)
            .await
    }

    pub async fn update_card(
        &self,
        credential: &Credential,
        card_id: CardId,
        update: &CardUpdate,
    ) -> Result<Card, BackendError> {
        let path = format!("/api/cards/{}", card_id);
        self.send_json(self.request(credential, Method::PUT, &path), update)
            .await
    }

    pub async fn update_group(
        &self,
        credential: &Credential,
        group_id: GroupId,
        form: &GroupForm,
    ) -> Result<Group, BackendError> {
        let path = format!("/api/groups/{}", group_id);
        self.send_json(self.request(credential, Method::PUT, &path), form)
            .await
    }

    /// 执行单个变更操作，响应体不关心
    pub async fn execute(
        &self,
        credential: &Credential,
        operation: &Operation,
    ) -> Result<(), BackendError> {
        let request = self.request(credential, operation.method(), &operation.path());
        let request = match operation {
            Operation::AddMembership { user_id, .. } => request.json(&MembershipBody {
                user_id: *user_id,
            }),
            Operation::GrantPermission {
                user_id,
                room_id,
                granted_by,
                valid_from,
            } => request.json(&GrantBody {
                user_id: *user_id,
                room_id: *room_id,
                granted_by: *granted_by,
                valid_from: *valid_from,
            }),
            Operation::RemoveMembership { .. } | Operation::RevokePermission { .. } => request,
        };

        check_status(request.send().await?).await?;
        Ok(())
    }

    /// 并发发出计划中的全部操作并等待全部结束。
    ///
    /// 失败的操作不会重试，已成功的操作也不会回滚。
    pub async fn apply(&self, credential: &Credential, plan: &AssignmentPlan) -> BatchReport {
        let results = join_all(plan.operations.iter().map(|operation| async move {
            (operation, self.execute(credential, operation).await)
        }))
        .await;

        let mut report = BatchReport::default();
        for (operation, result) in results {
            match result {
                Ok(()) => report.applied.push(operation.clone()),
                Err(e) => {
                    tracing::error!("Operation {:?} failed: {}", operation, e);
                    report.failed.push(FailedOperation {
                        operation: operation.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Applied {}/{} operation(s) for user {}",
            report.applied.len(),
            report.total(),
            plan.user_id
        );
        report
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => err.error,
        Err(_) if !body.is_empty() => body,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedOperation {
    pub operation: Operation,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub applied: Vec<Operation>,
    pub failed: Vec<FailedOperation>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 任意一个操作失败都视为整批失败，只给操作员一条概括性的错误
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::PartialBatch {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}
