//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use mockable::Clock;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::command::domain::{ChatUser, CommandContext};
use crate::error::ErrorKind;
use crate::identity::ports::UserRepository;
use crate::notification::domain::ChannelId;
use crate::task::ports::TaskRepository;
use crate::webhook::{
    domain::{SIGNATURE_HEADER, verify_signature},
    ports::SubscriptionRepository,
};

const EVENT_HEADER: &str = "X-GitHub-Event";

/// A platform user inside a [`CommandEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeUser {
    /// Platform identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Body of `POST /commands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Invoking user.
    pub user: EnvelopeUser,
    /// Channel the command was issued in.
    pub channel: String,
    /// Raw command text, e.g. `/get-task task-id=1`.
    pub text: String,
    /// Users the platform resolved for user options.
    #[serde(default)]
    pub users: Vec<EnvelopeUser>,
}

impl CommandEnvelope {
    fn context(&self) -> Result<CommandContext, String> {
        let invoker = ChatUser::new(self.user.id.as_str(), self.user.name.as_str())
            .map_err(|err| err.to_string())?;
        let channel = ChannelId::new(self.channel.as_str()).map_err(|err| err.to_string())?;
        self.users
            .iter()
            .try_fold(CommandContext::new(invoker, channel), |context, user| {
                ChatUser::new(user.id.as_str(), user.name.as_str())
                    .map(|resolved| context.with_user(resolved))
                    .map_err(|err| err.to_string())
            })
    }
}

/// Body returned by `POST /commands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the command succeeded.
    pub ok: bool,
    /// Reply text for the invoking user.
    pub text: String,
    /// Failure category label, absent on success.
    pub error: Option<String>,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub(super) async fn github_webhook<T, U, S, C>(
    State(state): State<AppState<T, U, S, C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    T: TaskRepository + 'static,
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = verify_signature(
        state.webhook_secret.expose_secret().as_bytes(),
        &body,
        signature,
    ) {
        tracing::warn!(error = %err, "rejected webhook delivery");
        return error_body(StatusCode::UNAUTHORIZED, err.to_string());
    }

    let Some(event) = headers.get(EVENT_HEADER).and_then(|value| value.to_str().ok()) else {
        return error_body(StatusCode::BAD_REQUEST, "missing X-GitHub-Event header");
    };
    match event {
        "ping" => return (StatusCode::OK, Json(json!({ "status": "pong" }))).into_response(),
        "push" => {}
        other => {
            tracing::debug!(event = other, "ignoring webhook event");
            return (
                StatusCode::ACCEPTED,
                Json(json!({ "status": "ignored", "event": other })),
            )
                .into_response();
        }
    }

    match state.webhooks.on_push_event(&body).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(err) => match err.kind() {
            ErrorKind::Validation => error_body(StatusCode::BAD_REQUEST, err.to_string()),
            ErrorKind::NotFound
            | ErrorKind::Conflict
            | ErrorKind::Delivery
            | ErrorKind::Internal => {
                tracing::error!(error = %err, "push event processing failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "push event processing failed")
            }
        },
    }
}

pub(super) async fn run_command<T, U, S, C>(
    State(state): State<AppState<T, U, S, C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    T: TaskRepository + 'static,
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !state.command_token.verify(authorization) {
        return error_body(StatusCode::UNAUTHORIZED, "invalid or missing bearer token");
    }

    let envelope: CommandEnvelope = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => return error_body(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let context = match envelope.context() {
        Ok(built) => built,
        Err(reason) => return error_body(StatusCode::BAD_REQUEST, reason),
    };

    let reply = state.commands.handle_text(&context, &envelope.text).await;
    Json(CommandResponse {
        ok: reply.is_success(),
        text: reply.text,
        error: reply.error.map(|kind| kind.as_str().to_owned()),
    })
    .into_response()
}
