use actix_web::{web, HttpRequest, HttpResponse, Responder};
use actix_ws::{CloseCode, CloseReason, Message, MessageStream, Session};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::AppState;
use crate::core::registry::{OutboundSender, SessionId};
use crate::models::{ClientSignal, Participant, RoomInfoResponse, ServerSignal, SignalingQuery};

/// Configure signaling routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webrtc")
            .route("/ws/{room_id}", web::get().to(signaling_ws))
            .route("/room/{room_id}/info", web::get().to(room_info)),
    );
}

/// WebSocket endpoint for call signaling
///
/// GET /api/webrtc/ws/{room_id}?token=...&user_id=...&user_name=...
///
/// Identity is resolved before admission: a valid token wins; otherwise the
/// explicit `user_id`/`user_name` fallback identity is used; with neither, the
/// socket is closed with a policy violation before joining the room.
async fn signaling_ws(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    query: web::Query<SignalingQuery>,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let room_id = path.into_inner();
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    let participant = match resolve_participant(&state, &query).await {
        Some(participant) => participant,
        None => {
            tracing::info!("Refusing unauthenticated connection to room {}", room_id);
            actix_web::rt::spawn(async move {
                let _ = session
                    .close(Some(CloseReason {
                        code: CloseCode::Policy,
                        description: Some("Authentication required".into()),
                    }))
                    .await;
            });
            return Ok(response);
        }
    };

    actix_web::rt::spawn(run_session(
        state.into_inner(),
        room_id,
        participant,
        session,
        msg_stream,
    ));

    Ok(response)
}

/// Resolve the connecting peer's identity from the query parameters
async fn resolve_participant(state: &AppState, query: &SignalingQuery) -> Option<Participant> {
    if let Some(token) = &query.token {
        match state.identity.resolve(token).await {
            Ok(participant) => return Some(participant),
            Err(e) => {
                tracing::warn!("Token resolution failed, trying fallback identity: {}", e);
            }
        }
    }

    fallback_identity(query)
}

/// Explicit fallback identity supplied as raw query parameters
fn fallback_identity(query: &SignalingQuery) -> Option<Participant> {
    query.user_id.as_ref().map(|user_id| {
        let user_name = query
            .user_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string());
        Participant::new(user_id.clone(), user_name)
    })
}

/// One admitted session: admission notices, message loop, leave notice
async fn run_session(
    state: Arc<AppState>,
    room_id: String,
    participant: Participant,
    session: Session,
    mut stream: MessageStream,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Writer task: pumps frames handed over by the registry into the socket.
    // When every sender is gone (session left) the loop ends and the socket
    // is closed.
    let mut writer = session.clone();
    actix_web::rt::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if writer.text(frame).await.is_err() {
                break;
            }
        }
        let _ = writer.close(None).await;
    });

    let (session_id, participant_count) =
        state
            .registry
            .join(&room_id, participant.clone(), tx.clone());

    tracing::info!(
        "{} ({}) joined room {} ({} participants)",
        participant.user_name,
        participant.user_id,
        room_id,
        participant_count
    );

    state.registry.broadcast(
        &room_id,
        Some(session_id),
        &ServerSignal::UserJoined {
            user: participant.clone(),
            participant_count,
        },
    );

    send_direct(
        &tx,
        &ServerSignal::RoomInfo {
            room_id: room_id.clone(),
            participants: state.registry.participants(&room_id, Some(session_id)),
            your_id: participant.user_id.clone(),
        },
    );

    let mut control = session;
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_frame(&state, &room_id, session_id, &participant, &tx, &text);
            }
            Ok(Message::Ping(bytes)) => {
                if control.pong(&bytes).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    // Revoke channel ownership before notifying the rest of the room. A
    // session already swept by a failed broadcast yields None and no
    // duplicate notice.
    drop(tx);
    if let Some((left, remaining)) = state.registry.leave(&room_id, session_id) {
        tracing::info!(
            "{} left room {} ({} remaining)",
            left.user_name,
            room_id,
            remaining
        );
        state.registry.broadcast(
            &room_id,
            None,
            &ServerSignal::UserLeft {
                user: left,
                participant_count: remaining,
            },
        );
    }
}

/// Dispatch one inbound frame
fn handle_frame(
    state: &AppState,
    room_id: &str,
    session_id: SessionId,
    participant: &Participant,
    tx: &OutboundSender,
    raw: &str,
) {
    let signal: ClientSignal = match serde_json::from_str(raw) {
        Ok(signal) => signal,
        Err(_) => {
            send_direct(
                tx,
                &ServerSignal::Error {
                    message: "Invalid JSON".to_string(),
                },
            );
            return;
        }
    };

    let from = participant.user_id.clone();
    let from_name = participant.user_name.clone();

    match signal {
        ClientSignal::Offer { offer } => {
            state.registry.broadcast(
                room_id,
                Some(session_id),
                &ServerSignal::Offer { offer, from, from_name },
            );
        }
        ClientSignal::Answer { answer, to } => {
            // Broadcast with the `to` hint rather than unicast; peers filter
            // on the target id themselves.
            state.registry.broadcast(
                room_id,
                Some(session_id),
                &ServerSignal::Answer { answer, from, from_name, to },
            );
        }
        ClientSignal::IceCandidate { candidate } => {
            state.registry.broadcast(
                room_id,
                Some(session_id),
                &ServerSignal::IceCandidate { candidate, from, from_name },
            );
        }
        ClientSignal::ToggleAudio { audio_enabled } => {
            state.registry.broadcast(
                room_id,
                Some(session_id),
                &ServerSignal::UserAudioToggled {
                    user_id: from,
                    audio_enabled,
                },
            );
        }
        ClientSignal::ToggleVideo { video_enabled } => {
            state.registry.broadcast(
                room_id,
                Some(session_id),
                &ServerSignal::UserVideoToggled {
                    user_id: from,
                    video_enabled,
                },
            );
        }
        ClientSignal::Ping => send_direct(tx, &ServerSignal::Pong),
        ClientSignal::Unknown => {}
    }
}

/// Best-effort direct reply to one session
fn send_direct(tx: &OutboundSender, signal: &ServerSignal) {
    match serde_json::to_string(signal) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(e) => {
            let _ = tx.send(
                serde_json::json!({"type": "error", "message": e.to_string()}).to_string(),
            );
        }
    }
}

/// Live room information
///
/// GET /api/webrtc/room/{room_id}/info
async fn room_info(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let room_id = path.into_inner();
    let participant_count = state.registry.participant_count(&room_id);

    HttpResponse::Ok().json(RoomInfoResponse {
        room_id,
        participant_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RoomRegistry, TaskMatcher};
    use crate::services::{BackendClient, IdentityResolver};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn test_state() -> AppState {
        let backend = Arc::new(BackendClient::new(
            "http://backend.test".to_string(),
            "key".to_string(),
            "/internal/ai/assignments".to_string(),
        ));
        AppState {
            registry: Arc::new(RoomRegistry::new()),
            identity: Arc::new(IdentityResolver::new("secret", backend.clone())),
            backend,
            matcher: TaskMatcher::with_default_weights(),
            delegate_enabled: false,
        }
    }

    fn frames(rx: &mut UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(serde_json::from_str(&frame).unwrap());
        }
        out
    }

    #[test]
    fn test_ping_replies_pong_without_broadcast() {
        let state = test_state();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let ada = Participant::new("1", "Ada");
        let (session_a, _) = state.registry.join("call-1", ada.clone(), tx_a.clone());
        let (_sb, _) = state.registry.join("call-1", Participant::new("2", "Grace"), tx_b);

        handle_frame(&state, "call-1", session_a, &ada, &tx_a, r#"{"type": "ping"}"#);

        let received = frames(&mut rx_a);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "pong");
        assert!(frames(&mut rx_b).is_empty(), "ping must not broadcast");
    }

    #[test]
    fn test_malformed_json_gets_error_reply() {
        let state = test_state();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let ada = Participant::new("1", "Ada");
        let (session_a, _) = state.registry.join("call-1", ada.clone(), tx_a.clone());
        let (_sb, _) = state.registry.join("call-1", Participant::new("2", "Grace"), tx_b);

        handle_frame(&state, "call-1", session_a, &ada, &tx_a, "{not json");

        let received = frames(&mut rx_a);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "error");
        assert!(frames(&mut rx_b).is_empty());
        // Session is not dropped on a parse error
        assert_eq!(state.registry.participant_count("call-1"), 2);
    }

    #[test]
    fn test_toggle_audio_broadcast_shape() {
        let state = test_state();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let ada = Participant::new("1", "Ada");
        let (session_a, _) = state.registry.join("call-1", ada.clone(), tx_a.clone());
        let (_sb, _) = state.registry.join("call-1", Participant::new("2", "Grace"), tx_b);

        handle_frame(
            &state,
            "call-1",
            session_a,
            &ada,
            &tx_a,
            r#"{"type": "toggle_audio", "audio_enabled": true}"#,
        );

        assert!(frames(&mut rx_a).is_empty());
        let received = frames(&mut rx_b);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "user_audio_toggled");
        assert_eq!(received[0]["user_id"], "1");
        assert_eq!(received[0]["audio_enabled"], true);
    }

    #[test]
    fn test_unknown_type_is_silently_ignored() {
        let state = test_state();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let ada = Participant::new("1", "Ada");
        let (session_a, _) = state.registry.join("call-1", ada.clone(), tx_a.clone());
        let (_sb, _) = state.registry.join("call-1", Participant::new("2", "Grace"), tx_b);

        handle_frame(
            &state,
            "call-1",
            session_a,
            &ada,
            &tx_a,
            r#"{"type": "raise_hand"}"#,
        );

        assert!(frames(&mut rx_a).is_empty());
        assert!(frames(&mut rx_b).is_empty());
    }

    #[test]
    fn test_fallback_identity_requires_user_id() {
        let query = SignalingQuery {
            token: None,
            user_id: None,
            user_name: Some("Ada".to_string()),
        };
        assert!(fallback_identity(&query).is_none());
    }

    #[test]
    fn test_fallback_identity_defaults_name_to_anonymous() {
        let query = SignalingQuery {
            token: None,
            user_id: Some("17".to_string()),
            user_name: None,
        };
        let participant = fallback_identity(&query).unwrap();
        assert_eq!(participant.user_id, "17");
        assert_eq!(participant.user_name, "Anonymous");
    }
}
