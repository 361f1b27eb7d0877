// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket event stream.
//!
//! `GET /ws?token=...&location=den[&room=patio][&after_seq=4]` streams one
//! location or room scope; `GET /ws?token=...&inbox=true` streams the caller's
//! private scope. Each frame is one JSON [`Envelope`]:
//!
//! ```json
//! {"scope": {"type": "location", "location_id": "den"}, "seq": 5,
//!  "payload": {"type": "chat", "data": {...}}, "published_at": "..."}
//! ```
//!
//! With `after_seq`, every persisted event after that sequence is replayed
//! before live delivery begins. Client frames are ignored apart from Close.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use wolfpack_bus::Subscription;
use wolfpack_core::events::Scope;
use wolfpack_core::types::Identity;

use crate::auth;
use crate::error::ApiError;
use crate::handlers::require_presence;
use crate::server::GatewayState;

/// Query parameters of the WebSocket handshake.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Bearer token; browsers cannot set headers on a WebSocket handshake.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub after_seq: Option<i64>,
    #[serde(default)]
    pub inbox: bool,
}

/// WebSocket upgrade handler. Authentication and scope checks run before
/// the upgrade so failures surface as plain HTTP errors.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> Response {
    let token = params
        .token
        .as_deref()
        .or_else(|| auth::bearer_token(&headers));
    let identity = match token {
        Some(token) => auth::resolve(&state, token).await,
        None => None,
    };
    let Some(identity) = identity else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let subscription = match open_subscription(&state, &identity, &params).await {
        Ok(sub) => sub,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(
        user_id = %identity.user_id,
        scope = %subscription.scope(),
        after_seq = subscription.last_seq(),
        "websocket subscribed"
    );
    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

/// Resolve the requested scope and subscribe to it.
pub(crate) async fn open_subscription(
    state: &GatewayState,
    identity: &Identity,
    params: &WsParams,
) -> Result<Subscription, ApiError> {
    let scope = if params.inbox {
        Scope::user(&identity.user_id)
    } else {
        let Some(location_id) = params.location.as_deref() else {
            return Err(ApiError::BadRequest(
                "either `location` or `inbox=true` is required".into(),
            ));
        };
        require_presence(state, identity, location_id).await?;
        Scope::for_message(location_id, params.room.as_deref())
    };

    match params.after_seq {
        Some(after_seq) => Ok(state.pack.bus.subscribe_from(&scope, after_seq)),
        None => Ok(state.pack.bus.subscribe(&scope).await?),
    }
}

/// Pump envelopes to the client until either side goes away.
async fn handle_socket(socket: WebSocket, mut subscription: Subscription) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let sender_task = tokio::spawn(async move {
        loop {
            let envelope = match subscription.recv().await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, scope = %subscription.scope(), "websocket stream failed");
                    break;
                }
            };
            let text = match serde_json::to_string(&envelope) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, seq = envelope.seq, "failed to encode envelope");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    sender_task.abort();
}
