// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Every handler behind the auth middleware receives the caller's
//! [`Identity`] from the request extensions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use wolfpack_core::events::{Envelope, Scope};
use wolfpack_core::policy::{AccessDecision, Action, DenyReason, PolicyContext};
use wolfpack_core::types::{
    ChatMessage, Coordinates, Identity, InteractionEvent, InteractionKind, Location,
    MembershipSession, Position, ProfileUpdate, Vote,
};
use wolfpack_core::WolfpackError;

use crate::error::ApiError;
use crate::server::GatewayState;

pub type ApiResult<T> = Result<T, ApiError>;

/// Default and maximum page sizes for history reads.
const DEFAULT_PAGE: usize = 100;
const MAX_PAGE: usize = 500;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the store answers, `degraded` otherwise.
    pub status: &'static str,
    /// Binary version.
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Request body for POST /v1/locations/{id}/admit.
#[derive(Debug, Deserialize)]
pub struct AdmitRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Request body for POST /v1/locations/{id}/access.
#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub action: ActionName,
    /// Required when `action` is `interact`.
    #[serde(default)]
    pub kind: Option<InteractionKind>,
    #[serde(default)]
    pub target_user_id: Option<String>,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

/// Flat action names accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    Order,
    Message,
    Vote,
    Broadcast,
    Interact,
}

impl AccessRequest {
    fn action(&self) -> ApiResult<Action> {
        Ok(match self.action {
            ActionName::Order => Action::Order,
            ActionName::Message => Action::Message,
            ActionName::Vote => Action::Vote,
            ActionName::Broadcast => Action::Broadcast,
            ActionName::Interact => match self.kind {
                Some(kind) => Action::for_interaction(kind),
                None => {
                    return Err(ApiError::BadRequest(
                        "`kind` is required for `interact`".into(),
                    ));
                }
            },
        })
    }
}

/// Request body for POST /v1/locations/{id}/interactions.
#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub receiver_id: String,
    pub kind: InteractionKind,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Request body for POST /v1/locations/{id}/messages and /broadcasts.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
    #[serde(default)]
    pub room: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option: String,
}

/// Query parameters for history reads.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub after_seq: Option<i64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    fn page(&self) -> (i64, usize) {
        (
            self.after_seq.unwrap_or(0).max(0),
            self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct TallyEntry {
    pub option: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TallyResponse {
    pub poll_id: String,
    pub results: Vec<TallyEntry>,
}

/// GET /health -- unauthenticated liveness plus a store round-trip.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.pack.storage.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            "degraded"
        }
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

pub async fn list_locations(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.pack.storage.list_locations().await?))
}

/// POST /v1/locations/{id}/admit
pub async fn admit(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Json(body): Json<AdmitRequest>,
) -> ApiResult<Json<MembershipSession>> {
    let coords = Coordinates::new(body.latitude, body.longitude);
    let admission = state
        .pack
        .membership
        .admit(&identity.user_id, &location_id, coords);
    let session = tokio::time::timeout(state.admission_timeout, admission)
        .await
        .map_err(|_| WolfpackError::Timeout {
            duration: state.admission_timeout,
        })??;
    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<MembershipSession>> {
    Ok(Json(owned_session(&state, &identity, &session_id).await?))
}

pub async fn heartbeat(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_session(&state, &identity, &session_id).await?;
    state.pack.membership.heartbeat(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    owned_session(&state, &identity, &session_id).await?;
    state.pack.membership.leave(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_profile(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<MembershipSession>> {
    owned_session(&state, &identity, &session_id).await?;
    let session = state
        .pack
        .membership
        .update_profile(&session_id, &update)
        .await?;
    Ok(Json(session))
}

pub async fn update_position(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
    Json(position): Json<Position>,
) -> ApiResult<Json<MembershipSession>> {
    owned_session(&state, &identity, &session_id).await?;
    let session = state
        .pack
        .membership
        .update_position(&session_id, position)
        .await?;
    Ok(Json(session))
}

/// GET /v1/locations/{id}/presence
pub async fn list_presence(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
) -> ApiResult<Json<Vec<MembershipSession>>> {
    require_presence(&state, &identity, &location_id).await?;
    Ok(Json(state.pack.presence.list_active(&location_id).await?))
}

/// POST /v1/locations/{id}/access -- evaluate without acting.
pub async fn check_access(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Json(body): Json<AccessRequest>,
) -> ApiResult<Json<AccessDecision>> {
    let action = body.action()?;
    let ctx = PolicyContext {
        target_user_id: body.target_user_id,
        item_ids: body.item_ids,
    };
    let decision = state
        .pack
        .policy
        .can_perform(&identity, &location_id, action, &ctx)
        .await?;
    Ok(Json(decision))
}

pub async fn send_interaction(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Json(body): Json<InteractionRequest>,
) -> ApiResult<(StatusCode, Json<InteractionEvent>)> {
    let event = state
        .pack
        .ledger
        .record(
            &identity,
            &body.receiver_id,
            body.kind,
            &location_id,
            body.payload,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/inbox -- fresh interactions addressed to the caller.
pub async fn inbox(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<InteractionEvent>>> {
    Ok(Json(state.pack.ledger.inbox(&identity.user_id).await?))
}

pub async fn mark_read(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<InteractionEvent>> {
    let event = state.pack.ledger.get(&event_id).await?;
    if event.receiver_id != identity.user_id {
        return Err(WolfpackError::InteractionNotFound(event_id).into());
    }
    Ok(Json(state.pack.ledger.mark_read(&event_id).await?))
}

pub async fn post_message(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Json(body): Json<MessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let content = non_empty(&body.content)?;
    let msg = state
        .pack
        .chat
        .post_message(&identity, &location_id, body.room.as_deref(), content)
        .await?;
    Ok((StatusCode::CREATED, Json(msg)))
}

pub async fn list_messages(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    require_presence(&state, &identity, &location_id).await?;
    let (after_seq, limit) = query.page();
    let scope = Scope::for_message(&location_id, query.room.as_deref());
    let messages = state
        .pack
        .chat
        .messages_since(&scope, after_seq, limit)
        .await?;
    Ok(Json(messages))
}

pub async fn broadcast(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Json(body): Json<MessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let content = non_empty(&body.content)?;
    let msg = state
        .pack
        .chat
        .broadcast(&identity, &location_id, content)
        .await?;
    Ok((StatusCode::CREATED, Json(msg)))
}

pub async fn delete_message(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(message_id): Path<String>,
) -> ApiResult<Json<ChatMessage>> {
    Ok(Json(state.pack.chat.soft_delete(&identity, &message_id).await?))
}

pub async fn flag_message(
    State(state): State<GatewayState>,
    Path(message_id): Path<String>,
    Json(body): Json<FlagRequest>,
) -> ApiResult<Json<ChatMessage>> {
    let reason = non_empty(&body.reason)?;
    Ok(Json(state.pack.chat.flag(&message_id, reason).await?))
}

pub async fn cast_vote(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path((location_id, poll_id)): Path<(String, String)>,
    Json(body): Json<VoteRequest>,
) -> ApiResult<Json<Vote>> {
    let option = non_empty(&body.option)?;
    let vote = state
        .pack
        .votes
        .cast_vote(&identity, &location_id, &poll_id, option)
        .await?;
    Ok(Json(vote))
}

pub async fn tally(
    State(state): State<GatewayState>,
    Path(poll_id): Path<String>,
) -> ApiResult<Json<TallyResponse>> {
    let results = state
        .pack
        .votes
        .tally(&poll_id)
        .await?
        .into_iter()
        .map(|(option, count)| TallyEntry { option, count })
        .collect();
    Ok(Json(TallyResponse { poll_id, results }))
}

/// GET /v1/locations/{id}/events -- persisted envelopes for reconciliation.
pub async fn list_events(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(location_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Envelope>>> {
    require_presence(&state, &identity, &location_id).await?;
    let (after_seq, limit) = query.page();
    let scope = Scope::for_message(&location_id, query.room.as_deref());
    Ok(Json(state.pack.bus.fetch_since(&scope, after_seq, limit).await?))
}

/// Load a session the caller may act on. Other members' sessions read as
/// missing; staff may act on any.
async fn owned_session(
    state: &GatewayState,
    identity: &Identity,
    session_id: &str,
) -> Result<MembershipSession, WolfpackError> {
    let session = state.pack.membership.get(session_id).await?;
    if session.user_id != identity.user_id && !identity.role.is_staff() {
        return Err(WolfpackError::SessionNotFound(session_id.to_string()));
    }
    Ok(session)
}

/// Location-scoped reads need an active session there, or a staff role.
pub(crate) async fn require_presence(
    state: &GatewayState,
    identity: &Identity,
    location_id: &str,
) -> Result<(), WolfpackError> {
    if identity.role.is_staff() {
        return Ok(());
    }
    match state
        .pack
        .membership
        .active_session(&identity.user_id, location_id)
        .await?
    {
        Some(_) => Ok(()),
        None => Err(WolfpackError::forbidden(DenyReason::NotAMember)),
    }
}

fn non_empty(s: &str) -> ApiResult<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest("content must not be empty".into()))
    } else {
        Ok(trimmed)
    }
}
