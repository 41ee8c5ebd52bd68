//! In-memory stand-in for the access-control backend.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use access_console::{
    AppState, app,
    backend::{GroupForm, RoomForm, UserForm},
    config::Config,
    models::{
        AccessLevel, Card, CardId, CardStatus, Group, GroupId, Permission, PermissionId, Room,
        RoomId, User, UserId,
    },
};
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

pub const TOKEN: &str = "test-token";
pub const OPERATOR: UserId = UserId(1);

pub struct FakeState {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub memberships: BTreeSet<(GroupId, UserId)>,
    pub permissions: Vec<Permission>,
    pub cards: Vec<Card>,
    pub rooms: Vec<Room>,
    /// `"METHOD /path"` for every authenticated request
    pub calls: Vec<String>,
    /// Paths answered with a 500 regardless of method
    pub failing_paths: Vec<String>,
    /// Users whose update carried a new password
    pub password_changes: Vec<UserId>,
    next_id: u64,
}

pub type Shared = Arc<Mutex<FakeState>>;

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn writes(&self) -> Vec<&String> {
        self.calls
            .iter()
            .filter(|call| !call.starts_with("GET "))
            .collect()
    }
}

fn user(id: u64, first_name: &str, last_name: &str) -> User {
    User {
        id: UserId(id),
        username: first_name.to_lowercase(),
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        is_admin: id == OPERATOR.0,
        active: true,
        groups: Vec::new(),
    }
}

fn group(id: u64, name: &str) -> Group {
    Group {
        id: GroupId(id),
        name: name.into(),
        description: String::new(),
        parent_id: None,
        access_level: AccessLevel::Restricted,
    }
}

fn permission(id: u64, user_id: u64, room_id: u64, active: bool) -> Permission {
    Permission {
        id: PermissionId(id),
        user_id: Some(UserId(user_id)),
        card_id: None,
        room_id: RoomId(room_id),
        granted_by: OPERATOR,
        valid_from: Utc::now() - Duration::days(10),
        valid_until: None,
        active,
    }
}

fn card(id: u64, owner: Option<u64>) -> Card {
    Card {
        id: CardId(id),
        card_id: format!("RFID-{id}"),
        user_id: owner.map(UserId),
        status: CardStatus::Active,
        expiry_date: None,
    }
}

/// Operator 1, user 7 in groups 1 and 2 with an active grant on room 3
/// and a revoked one on room 4. Cards 10 and 11 belong to users 7 and 8.
pub fn seeded() -> FakeState {
    FakeState {
        users: vec![
            user(1, "Admin", "Operator"),
            user(7, "Anna", "Kovacs"),
            user(8, "Bela", "Szabo"),
            user(9, "Csilla", "Toth"),
        ],
        groups: vec![group(1, "Staff"), group(2, "Lab"), group(3, "Night shift")],
        memberships: BTreeSet::from([(GroupId(1), UserId(7)), (GroupId(2), UserId(7))]),
        permissions: vec![permission(50, 7, 3, true), permission(51, 7, 4, false)],
        cards: vec![card(10, Some(7)), card(11, Some(8)), card(12, None)],
        rooms: Vec::new(),
        calls: Vec::new(),
        failing_paths: Vec::new(),
        password_changes: Vec::new(),
        next_id: 100,
    }
}

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "error": message })))
}

async fn record_and_authorize(
    State(shared): State<Shared>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str());
    if !authorized {
        return failure(StatusCode::UNAUTHORIZED, "missing or invalid token").into_response();
    }

    let path = req.uri().path().to_string();
    let injected = {
        let mut state = shared.lock().unwrap();
        state.calls.push(format!("{} {}", req.method(), path));
        state.failing_paths.contains(&path)
    };
    if injected {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    next.run(req).await
}

async fn me(State(shared): State<Shared>) -> Result<Json<User>, Failure> {
    let state = shared.lock().unwrap();
    state
        .users
        .iter()
        .find(|user| user.id == OPERATOR)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "operator not found"))
}

async fn list_users(State(shared): State<Shared>) -> Json<Vec<User>> {
    Json(shared.lock().unwrap().users.clone())
}

async fn get_user(
    State(shared): State<Shared>,
    Path(id): Path<u64>,
) -> Result<Json<User>, Failure> {
    let state = shared.lock().unwrap();
    let mut user = state
        .users
        .iter()
        .find(|user| user.id == UserId(id))
        .cloned()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))?;
    user.groups = state
        .groups
        .iter()
        .filter(|group| state.memberships.contains(&(group.id, user.id)))
        .cloned()
        .collect();
    Ok(Json(user))
}

async fn create_user(
    State(shared): State<Shared>,
    Json(form): Json<UserForm>,
) -> Result<(StatusCode, Json<User>), Failure> {
    let mut state = shared.lock().unwrap();
    if state.users.iter().any(|user| user.username == form.username) {
        return Err(failure(StatusCode::BAD_REQUEST, "username already exists"));
    }
    let id = state.next_id();
    let user = User {
        id: UserId(id),
        username: form.username,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        is_admin: form.is_admin,
        active: form.active,
        groups: Vec::new(),
    };
    state.users.push(user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(shared): State<Shared>,
    Path(id): Path<u64>,
    Json(form): Json<UserForm>,
) -> Result<Json<User>, Failure> {
    let mut state = shared.lock().unwrap();
    if form.password.is_some() {
        state.password_changes.push(UserId(id));
    }
    let user = state
        .users
        .iter_mut()
        .find(|user| user.id == UserId(id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))?;
    user.username = form.username;
    user.first_name = form.first_name;
    user.last_name = form.last_name;
    user.email = form.email;
    user.is_admin = form.is_admin;
    user.active = form.active;
    Ok(Json(user.clone()))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "access control backend" }))
}

async fn list_permissions(
    State(shared): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Permission>> {
    let user_id = params
        .get("user_id")
        .and_then(|id| id.parse::<u64>().ok())
        .map(UserId);
    let state = shared.lock().unwrap();
    Json(
        state
            .permissions
            .iter()
            .filter(|perm| user_id.is_none() || perm.user_id == user_id)
            .cloned()
            .collect(),
    )
}

#[derive(Deserialize)]
struct NewPermission {
    user_id: UserId,
    room_id: RoomId,
    granted_by: UserId,
    valid_from: DateTime<Utc>,
}

async fn create_permission(
    State(shared): State<Shared>,
    Json(body): Json<NewPermission>,
) -> (StatusCode, Json<Permission>) {
    let mut state = shared.lock().unwrap();
    let id = state.next_id();
    let permission = Permission {
        id: PermissionId(id),
        user_id: Some(body.user_id),
        card_id: None,
        room_id: body.room_id,
        granted_by: body.granted_by,
        valid_from: body.valid_from,
        valid_until: None,
        active: true,
    };
    state.permissions.push(permission.clone());
    (StatusCode::CREATED, Json(permission))
}

async fn revoke_permission(
    State(shared): State<Shared>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    let mut state = shared.lock().unwrap();
    let permission = state
        .permissions
        .iter_mut()
        .find(|perm| perm.id == PermissionId(id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "permission not found"))?;
    permission.active = false;
    Ok(Json(json!({ "message": "revoked" })))
}

#[derive(Deserialize)]
struct MembershipBody {
    user_id: UserId,
}

async fn add_member(
    State(shared): State<Shared>,
    Path(group_id): Path<u64>,
    Json(body): Json<MembershipBody>,
) -> Result<Json<Value>, Failure> {
    let mut state = shared.lock().unwrap();
    let group_id = GroupId(group_id);
    if !state.groups.iter().any(|group| group.id == group_id) {
        return Err(failure(StatusCode::NOT_FOUND, "group not found"));
    }
    if !state.memberships.insert((group_id, body.user_id)) {
        return Err(failure(StatusCode::BAD_REQUEST, "user already in group"));
    }
    Ok(Json(json!({ "message": "added" })))
}

async fn remove_member(
    State(shared): State<Shared>,
    Path((group_id, user_id)): Path<(u64, u64)>,
) -> Json<Value> {
    let mut state = shared.lock().unwrap();
    state
        .memberships
        .remove(&(GroupId(group_id), UserId(user_id)));
    Json(json!({ "message": "removed" }))
}

async fn list_cards(State(shared): State<Shared>) -> Json<Vec<Card>> {
    Json(shared.lock().unwrap().cards.clone())
}

#[derive(Deserialize)]
struct CardBody {
    user_id: Option<UserId>,
}

async fn update_card(
    State(shared): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<CardBody>,
) -> Result<Json<Card>, Failure> {
    let mut state = shared.lock().unwrap();
    let card = state
        .cards
        .iter_mut()
        .find(|card| card.id == CardId(id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "card not found"))?;
    card.user_id = body.user_id;
    Ok(Json(card.clone()))
}

async fn list_groups(State(shared): State<Shared>) -> Json<Vec<Group>> {
    Json(shared.lock().unwrap().groups.clone())
}

async fn update_group(
    State(shared): State<Shared>,
    Path(id): Path<u64>,
    Json(form): Json<GroupForm>,
) -> Result<Json<Group>, Failure> {
    let mut state = shared.lock().unwrap();
    let group = state
        .groups
        .iter_mut()
        .find(|group| group.id == GroupId(id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "group not found"))?;
    group.name = form.name;
    group.description = form.description;
    group.parent_id = form.parent_id;
    group.access_level = form.access_level;
    Ok(Json(group.clone()))
}

async fn create_room(
    State(shared): State<Shared>,
    Json(form): Json<RoomForm>,
) -> (StatusCode, Json<Room>) {
    let mut state = shared.lock().unwrap();
    let id = state.next_id();
    let room = Room {
        id: RoomId(id),
        name: form.name,
        building: form.building,
        room_number: form.room_number,
        access_level: form.access_level,
        capacity: form.capacity,
        operating_hours: form.operating_hours,
        operating_days: form.operating_days,
    };
    state.rooms.push(room.clone());
    (StatusCode::CREATED, Json(room))
}

/// Starts the fake backend and returns its base URL.
pub async fn spawn_backend(state: FakeState) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));

    let router = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).put(update_user))
        .route(
            "/api/permissions",
            get(list_permissions).post(create_permission),
        )
        .route("/api/permissions/{id}/revoke", post(revoke_permission))
        .route("/api/groups", get(list_groups))
        .route("/api/groups/{id}", put(update_group))
        .route("/api/groups/{id}/users", post(add_member))
        .route("/api/groups/{id}/users/{user_id}", delete(remove_member))
        .route("/api/cards", get(list_cards))
        .route("/api/cards/{id}", put(update_card))
        .route("/api/rooms", post(create_room))
        .layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            record_and_authorize,
        ))
        // 根路径不需要凭据，也不记录
        .route("/", get(root))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend listener");
    let addr = listener.local_addr().expect("backend addr");
    tokio::spawn(async move { axum::serve(listener, router).await.expect("serve backend") });

    (format!("http://{addr}"), shared)
}

/// Starts the console service in front of `backend_url` and returns its API base URL.
pub async fn spawn_console(backend_url: &str) -> String {
    let config = Config {
        backend_url: backend_url.to_string(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/console".into(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind console listener");
    let addr = listener.local_addr().expect("console addr");
    let router = app(AppState::new(config));
    tokio::spawn(async move { axum::serve(listener, router).await.expect("serve console") });

    format!("http://{addr}/console")
}
