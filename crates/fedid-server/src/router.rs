//! Router and request handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use fedid_core::{Error as CoreError, Event, EventType};
use fedid_model::ResolutionContext;
use fedid_protocol_saml::bindings::{HttpPostBinding, SamlMessageType};
use fedid_protocol_saml::{serialize_assertion, AssertionBuilder, NameId};
use fedid_resolver::ResolverError;

use crate::state::AppState;

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resolve", post(resolve))
        .route("/saml/sso", get(saml_sso))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Resolution request body.
#[derive(Debug, Deserialize)]
struct ResolveRequest {
    /// Principal to resolve attributes for.
    principal: String,
    /// Requesting relying party entity ID, if authenticated.
    #[serde(default)]
    requester: Option<String>,
    /// Attribute ids to resolve. Omitted means every configured
    /// definition.
    #[serde(default)]
    attributes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ResolvedAttribute {
    id: String,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    principal: String,
    attributes: Vec<ResolvedAttribute>,
}

/// Maps resolver failures into the shared error taxonomy.
fn to_core_error(error: ResolverError) -> CoreError {
    match error {
        ResolverError::UnknownAttribute(id) => CoreError::NotFound(format!("attribute {id}")),
        ResolverError::Configuration(message) => CoreError::Config(message),
        other => CoreError::Resolution(other.to_string()),
    }
}

fn error_response(error: &CoreError) -> (StatusCode, String) {
    if error.is_server_error() {
        tracing::error!(error = %error, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    } else if error.is_client_error() {
        (StatusCode::NOT_FOUND, error.to_string())
    } else {
        tracing::warn!(error = %error, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, (StatusCode, String)> {
    let mut ctx = ResolutionContext::new(&request.principal)
        .with_responder(&state.config.issuer.entity_id);
    if let Some(requester) = &request.requester {
        ctx = ctx.with_requester(requester);
    }

    let requested: Vec<String> = match request.attributes {
        Some(ids) => ids,
        None => state
            .resolver()
            .attribute_ids()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let resolved = state
        .resolver()
        .resolve(&ctx, &requested)
        .await
        .map_err(|e| error_response(&to_core_error(e)))?;

    let event = Event::success(EventType::AttributeResolution)
        .with_principal(&request.principal)
        .with_detail(format!("{} attributes resolved", resolved.len()));
    tracing::info!(target: "audit", event = ?event, "attributes resolved");

    let attributes = resolved
        .iter()
        .filter_map(|attr| match attr.encoded_values() {
            Ok(values) => Some(ResolvedAttribute {
                id: attr.id().to_string(),
                values,
            }),
            Err(e) => {
                tracing::warn!(attribute = %attr.id(), error = %e, "value encoding failed");
                None
            }
        })
        .collect();

    Ok(Json(ResolveResponse {
        principal: request.principal,
        attributes,
    }))
}

/// SSO query parameters.
///
/// Authentication is outside this subsystem: deployments front this
/// endpoint with their authentication layer, which asserts the principal.
#[derive(Debug, Deserialize)]
struct SsoParams {
    /// Authenticated principal.
    principal: String,
    /// Relying party entity ID.
    sp: String,
    /// Assertion consumer service URL the form posts to.
    acs_url: String,
    /// Opaque state echoed back to the relying party.
    #[serde(default)]
    relay_state: Option<String>,
}

async fn saml_sso(
    State(state): State<AppState>,
    Query(params): Query<SsoParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let ctx = ResolutionContext::new(&params.principal)
        .with_requester(&params.sp)
        .with_responder(&state.config.issuer.entity_id);

    let requested: Vec<String> = state
        .resolver()
        .attribute_ids()
        .into_iter()
        .map(str::to_string)
        .collect();

    let resolved = state
        .resolver()
        .resolve(&ctx, &requested)
        .await
        .map_err(|e| error_response(&to_core_error(e)))?;

    let name_id = NameId::transient(format!("_t{}", uuid::Uuid::new_v4().simple()))
        .with_name_qualifier(&state.config.issuer.entity_id)
        .with_sp_name_qualifier(&params.sp);

    let assertion = AssertionBuilder::new(&state.config.issuer.entity_id, &params.sp, name_id)
        .lifetime_secs(state.config.issuer.assertion_lifetime_secs)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .recipient(&params.acs_url)
        .attributes(&resolved)
        .build();

    let event = Event::success(EventType::AssertionIssued)
        .with_principal(&params.principal)
        .with_requester(&params.sp);
    tracing::info!(target: "audit", event = ?event, "assertion issued");

    let xml = serialize_assertion(&assertion);
    let html = HttpPostBinding::encode(
        &xml,
        &params.acs_url,
        params.relay_state.as_deref(),
        SamlMessageType::Response,
    );
    Ok(Html(html))
}
