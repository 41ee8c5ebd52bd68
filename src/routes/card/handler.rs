use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    AppState,
    backend::{CardUpdate, Credential},
    eligibility::{eligible_card_owners, ensure_card_owner_eligible},
    error::AppError,
    models::{Card, CardId},
    utils::success_to_api_response,
};

use super::model::{AssignOwnerRequest, AssignedCard, EligibleOwnersQuery, OwnerCandidate};

fn find_card(cards: &[Card], card_id: CardId) -> Result<&Card, AppError> {
    cards
        .iter()
        .find(|card| card.id == card_id)
        .ok_or_else(|| AppError::NotFound(format!("卡片 {} 不存在", card_id)))
}

#[axum::debug_handler]
pub async fn eligible_owners(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<EligibleOwnersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (users, cards) = tokio::try_join!(
        state.backend.list_users(&credential),
        state.backend.list_cards(&credential),
    )?;

    let editing = query
        .card_id
        .map(|card_id| find_card(&cards, card_id))
        .transpose()?;
    let owner = editing.and_then(|card| card.user_id);

    let candidates = eligible_card_owners(&users, &cards, editing)
        .into_iter()
        .map(|user| OwnerCandidate::new(user, owner))
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, success_to_api_response(candidates)))
}

#[axum::debug_handler]
pub async fn assign_owner(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(card_id): Path<CardId>,
    Json(req): Json<AssignOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cards = state.backend.list_cards(&credential).await?;
    let card = find_card(&cards, card_id)?;

    if let Some(user_id) = req.user_id {
        ensure_card_owner_eligible(user_id, &cards, Some(card_id))?;
    }

    let update = CardUpdate {
        card_id: card.card_id.clone(),
        user_id: req.user_id,
        status: card.status,
        expiry_date: card.expiry_date,
    };
    let updated = state
        .backend
        .update_card(&credential, card_id, &update)
        .await?;
    tracing::info!(
        "Card {} assigned to {:?} (was {:?})",
        card_id,
        updated.user_id,
        card.user_id
    );

    let assigned = AssignedCard::new(updated, Utc::now());
    if assigned.card.user_id.is_some() && !assigned.active {
        tracing::warn!(
            "Card {} has an owner but cannot open doors ({:?})",
            card_id,
            assigned.card.status
        );
    }

    Ok((StatusCode::OK, success_to_api_response(assigned)))
}
