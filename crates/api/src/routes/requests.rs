//! Request lifecycle endpoint handlers for the three workflows.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use domain::models::location::LocationRef;
use domain::models::request::{
    Assignee, BearerRequest, CleanerRequest, RequestKind, RequestOption, VisitorRequest,
    WorkedKind,
};
use domain::models::settings::{typed_view, AssignmentSettings, NotificationSettings};
use domain::search::pipeline::DateRange;
use domain::services::assignment::{
    decide_assignment, eligible_assignees, AssignmentDecision, AssignmentStrategy,
};
use domain::services::notification::RequestNotification;
use domain::services::resolve_module_settings;
use domain::store::{RequestStore, SiteDirectory};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SiteContext;
use crate::routes::settings::kiosk_key_hash;
use crate::services::notifier::dispatch_fire_and_forget;

/// Header carrying the visitor kiosk API key.
pub const KIOSK_KEY_HEADER: &str = "x-kiosk-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBearerRequest {
    pub from: LocationRef,
    pub to: LocationRef,
    pub requested_on: DateTime<Utc>,
    #[serde(default)]
    pub options: Vec<RequestOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCleanerRequest {
    pub from: LocationRef,
    pub requested_on: DateTime<Utc>,
    #[serde(default)]
    pub options: Vec<RequestOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitorRequest {
    pub request_for: LocationRef,
    pub requested_on: DateTime<Utc>,
    #[serde(default)]
    pub options: Vec<RequestOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequestResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<Assignee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequestBody {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub user_label: String,
    pub assigned_on: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequestBody {
    pub request_id: Uuid,
    pub completed_on: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListRequestsQuery {
    fn range(&self) -> Result<Option<DateRange>, ApiError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok(Some(DateRange::new(from, to)?)),
            (Some(from), None) => Ok(Some(DateRange::new(from, DateTime::<Utc>::MAX_UTC)?)),
            (None, _) => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfServiceQuery {
    /// Turnaround target in minutes; requests open longer than this are out
    /// of service.
    pub service_level: i64,
}

// =========================================================================
// Bearer workflow
// =========================================================================

/// PUT /api/v1/bearer/requests
pub async fn create_bearer(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<CreateBearerRequest>,
) -> Result<Json<CreatedRequestResponse>, ApiError> {
    let request = BearerRequest::new(
        body.from.clone(),
        body.to.clone(),
        body.options,
        body.requested_on,
    );
    let id = request.id;
    state.store.insert_bearer(site.db(), request).await?;
    info!(request_id = %id, site = %site.site.label, "bearer request created");

    let notification =
        RequestNotification::bearer_created(&site.site.label, &body.from, &body.to);
    let assigned = route_new_request(
        &state,
        &site,
        WorkedKind::Bearer,
        id,
        body.requested_on,
        notification,
    )
    .await?;
    Ok(Json(CreatedRequestResponse { id, assigned }))
}

/// GET /api/v1/bearer/requests?from=&to=
pub async fn list_bearer(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<BearerRequest>>, ApiError> {
    let range = query.range()?;
    Ok(Json(state.store.list_bearer(site.db(), range.as_ref()).await?))
}

/// PUT /api/v1/bearer/requests/accept
pub async fn accept_bearer(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<AcceptRequestBody>,
) -> Result<(), ApiError> {
    accept(&state, &site, WorkedKind::Bearer, body).await
}

/// PUT /api/v1/bearer/requests/completed
pub async fn complete_bearer(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<CompleteRequestBody>,
) -> Result<(), ApiError> {
    state
        .store
        .complete_request(site.db(), WorkedKind::Bearer, body.request_id, body.completed_on)
        .await?;
    Ok(())
}

/// GET /api/v1/bearer/requests/out-of-service?serviceLevel=45
pub async fn bearer_out_of_service(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<OutOfServiceQuery>,
) -> Result<Json<Vec<BearerRequest>>, ApiError> {
    let cutoff = out_of_service_cutoff(query.service_level)?;
    Ok(Json(state.store.open_bearer_before(site.db(), cutoff).await?))
}

// =========================================================================
// Cleaner workflow
// =========================================================================

/// PUT /api/v1/cleaner/requests
pub async fn create_cleaner(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<CreateCleanerRequest>,
) -> Result<Json<CreatedRequestResponse>, ApiError> {
    let request = CleanerRequest::new(body.from.clone(), body.options, body.requested_on);
    let id = request.id;
    state.store.insert_cleaner(site.db(), request).await?;
    info!(request_id = %id, site = %site.site.label, "cleaner request created");

    let notification = RequestNotification::cleaner_created(&site.site.label, &body.from);
    let assigned = route_new_request(
        &state,
        &site,
        WorkedKind::Cleaner,
        id,
        body.requested_on,
        notification,
    )
    .await?;
    Ok(Json(CreatedRequestResponse { id, assigned }))
}

/// GET /api/v1/cleaner/requests?from=&to=
pub async fn list_cleaner(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<CleanerRequest>>, ApiError> {
    let range = query.range()?;
    Ok(Json(state.store.list_cleaner(site.db(), range.as_ref()).await?))
}

/// PUT /api/v1/cleaner/requests/accept
pub async fn accept_cleaner(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<AcceptRequestBody>,
) -> Result<(), ApiError> {
    accept(&state, &site, WorkedKind::Cleaner, body).await
}

/// PUT /api/v1/cleaner/requests/completed
pub async fn complete_cleaner(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<CompleteRequestBody>,
) -> Result<(), ApiError> {
    state
        .store
        .complete_request(site.db(), WorkedKind::Cleaner, body.request_id, body.completed_on)
        .await?;
    Ok(())
}

/// GET /api/v1/cleaner/requests/out-of-service?serviceLevel=30
pub async fn cleaner_out_of_service(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<OutOfServiceQuery>,
) -> Result<Json<Vec<CleanerRequest>>, ApiError> {
    let cutoff = out_of_service_cutoff(query.service_level)?;
    Ok(Json(state.store.open_cleaner_before(site.db(), cutoff).await?))
}

// =========================================================================
// Visitor workflow
// =========================================================================

/// PUT /api/v1/visitor/check-in — kiosk endpoint.
///
/// Authenticated by the per-site kiosk key when one is configured; visits are
/// informational and never assigned.
pub async fn visitor_check_in(
    State(state): State<AppState>,
    site: SiteContext,
    headers: HeaderMap,
    Json(body): Json<CreateVisitorRequest>,
) -> Result<Json<CreatedRequestResponse>, ApiError> {
    if let Some(hash) = kiosk_key_hash(&state, &site).await? {
        let presented = headers
            .get(KIOSK_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !shared::crypto::key_matches(presented, &hash) {
            return Err(ApiError::Forbidden("Access denied".to_string()));
        }
    }

    let request = VisitorRequest::new(body.request_for, body.options, body.requested_on);
    let id = request.id;
    state.store.insert_visitor(site.db(), request).await?;
    info!(request_id = %id, site = %site.site.label, "visitor check-in recorded");
    Ok(Json(CreatedRequestResponse { id, assigned: None }))
}

/// GET /api/v1/visitor/requests?from=&to=
pub async fn list_visitor(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<VisitorRequest>>, ApiError> {
    let range = query.range()?;
    Ok(Json(state.store.list_visitor(site.db(), range.as_ref()).await?))
}

// =========================================================================
// Shared routing
// =========================================================================

async fn accept(
    state: &AppState,
    site: &SiteContext,
    kind: WorkedKind,
    body: AcceptRequestBody,
) -> Result<(), ApiError> {
    let assignee = Assignee {
        id: body.user_id,
        label: body.user_label,
    };
    state
        .store
        .assign_request(site.db(), kind, body.request_id, assignee, body.assigned_on)
        .await?;
    Ok(())
}

fn out_of_service_cutoff(service_level_minutes: i64) -> Result<DateTime<Utc>, ApiError> {
    if service_level_minutes < 0 {
        return Err(ApiError::Validation(
            "serviceLevel must not be negative".to_string(),
        ));
    }
    Ok(Utc::now() - Duration::minutes(service_level_minutes))
}

/// Routes a newly created worked request: resolves the module's assignment
/// settings, either assigns directly (Round-Robin) or leaves the request for
/// acceptance (Notify-Accept), and publishes the topic notification without
/// blocking the response.
async fn route_new_request(
    state: &AppState,
    site: &SiteContext,
    kind: WorkedKind,
    request_id: Uuid,
    requested_on: DateTime<Utc>,
    notification: RequestNotification,
) -> Result<Option<Assignee>, ApiError> {
    let module = RequestKind::from(kind);
    let resolved = resolve_module_settings(
        state.store.as_ref(),
        state.store.registry_db(),
        site.db(),
        module.as_str(),
    )
    .await?;
    let assignment_settings: AssignmentSettings = typed_view(&resolved.merged());
    let strategy = AssignmentStrategy::from_settings(&assignment_settings);

    let accounts = state.store.accounts(None, Some(module.as_str())).await;
    let eligible = eligible_assignees(&accounts, module.as_str(), &assignment_settings, requested_on);
    let last = state.store.latest_assignee(site.db(), kind).await?;

    let assigned = match decide_assignment(strategy, eligible, last) {
        AssignmentDecision::Direct(assignee) => {
            state
                .store
                .assign_request(site.db(), kind, request_id, assignee.clone(), requested_on)
                .await?;
            info!(request_id = %request_id, assignee = %assignee.label, "request assigned");
            Some(assignee)
        }
        AssignmentDecision::Notify(_) | AssignmentDecision::NoneEligible => None,
    };

    // site-level topics win over org-level ones; blank means unconfigured
    let config = resolve_module_settings(
        state.store.as_ref(),
        state.store.registry_db(),
        site.db(),
        "config",
    )
    .await?;
    let topics: NotificationSettings = typed_view(&config.merged());
    if let Some(topic) = topics.topic_for(module) {
        dispatch_fire_and_forget(state.notifier.clone(), topic.to_string(), notification);
    }

    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_range() {
        let both = ListRequestsQuery {
            from: Some(Utc::now() - Duration::days(1)),
            to: Some(Utc::now()),
        };
        assert!(both.range().unwrap().is_some());

        let open_ended = ListRequestsQuery {
            from: Some(Utc::now()),
            to: None,
        };
        assert!(open_ended.range().unwrap().is_some());

        let none = ListRequestsQuery {
            from: None,
            to: Some(Utc::now()),
        };
        assert!(none.range().unwrap().is_none());
    }

    #[test]
    fn test_inverted_list_range_rejected() {
        let query = ListRequestsQuery {
            from: Some(Utc::now()),
            to: Some(Utc::now() - Duration::days(1)),
        };
        assert!(query.range().is_err());
    }

    #[test]
    fn test_negative_service_level_rejected() {
        assert!(out_of_service_cutoff(-5).is_err());
        assert!(out_of_service_cutoff(45).is_ok());
    }
}
