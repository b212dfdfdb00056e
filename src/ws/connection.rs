//! WebSocket connection loop.
//!
//! Each connection reads client commands and forwards matching events from
//! the bus until either side closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{ParsedTargets, SubscriptionManager};
use crate::api::dto::AccountResponse;
use crate::domain::{AccountId, EconomyEvent};
use crate::service::EconomyService;

/// Runs the read/write loop for one WebSocket connection.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<EconomyEvent>,
    economy: Arc<EconomyService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &economy).await;
                        if ws_tx.send(Message::text(reply.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(event.account_id()) {
                            continue;
                        }
                        let frame = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            serde_json::to_value(&event).unwrap_or_default(),
                        );
                        if ws_tx.send(Message::text(frame.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text frame from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    economy: &EconomyService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { account_ids } => {
            let targets = ParsedTargets::parse(&account_ids);
            subs.subscribe(&targets);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": targets.ids,
                    "rejected": targets.rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { account_ids } => {
            let targets = ParsedTargets::parse(&account_ids);
            subs.unsubscribe(&targets);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": targets.ids,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetMarket => WsMessage::new(
            msg.id,
            WsMessageType::Response,
            serde_json::to_value(economy.market(Utc::now())).unwrap_or_default(),
        ),
        WsCommand::GetAccount { account_id } => {
            let Ok(uuid) = account_id.parse::<uuid::Uuid>() else {
                return WsMessage::error(msg.id, 400, "account_id must be a UUID");
            };
            match economy.account(AccountId::from_uuid(uuid)).await {
                Ok(account) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(AccountResponse::from(&account)).unwrap_or_default(),
                ),
                Err(e) => {
                    let code = e.status_code().as_u16();
                    WsMessage::error(msg.id, code, &e.to_string())
                }
            }
        }
    }
}
