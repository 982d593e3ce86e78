//! Staff account endpoint handlers.
//!
//! Accounts live in the registry database and span all sites. Credential
//! provisioning belongs to the external identity provider; creating an
//! account here only records the profile.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::account::{
    Account, DevicePresence, HeartbeatRequest, Presence, UpsertAccountRequest,
};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub email: Option<String>,
    pub role: Option<String>,
}

/// List accounts, optionally narrowed by exact email and/or role name.
///
/// GET /api/v1/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>, ApiError> {
    let email = query.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    let role = query.role.as_deref().map(str::trim).filter(|r| !r.is_empty());
    Ok(Json(state.store.accounts(email, role).await))
}

/// Create or update an account.
///
/// PUT /api/v1/accounts
pub async fn upsert_account(
    State(state): State<AppState>,
    Json(request): Json<UpsertAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    request.validate()?;

    let account = match request.id {
        None => {
            let account = Account {
                id: Uuid::new_v4(),
                // the identity provider assigns the real subject on first
                // login; until then the account carries a local marker
                external_id: format!("local|{}", Uuid::new_v4()),
                first_name: request.first_name,
                last_name: request.last_name,
                role: request.role,
                email: request.email,
                phone: request.phone,
                status: Presence::Offline,
                device_status: DevicePresence::Unknown,
                last_seen: Utc::now(),
            };
            info!(account_id = %account.id, email = %account.email, "account created");
            account
        }
        Some(id) => {
            let mut account = state
                .store
                .account(id)
                .await
                .ok_or_else(|| ApiError::NotFound(format!("account {id}")))?;
            account.first_name = request.first_name;
            account.last_name = request.last_name;
            account.role = request.role;
            account.email = request.email;
            account.phone = request.phone;
            account
        }
    };

    state.store.upsert_account(account.clone()).await;
    Ok(Json(account))
}

/// Delete an account. The identity-provider subject is revoked separately.
///
/// DELETE /api/v1/accounts/:id
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    state.store.delete_account(id).await?;
    info!(account_id = %id, "account deleted");
    Ok(())
}

/// Record a presence heartbeat from a staff device.
///
/// PUT /api/v1/accounts/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(request): Json<HeartbeatRequest>,
) -> Result<(), ApiError> {
    state
        .store
        .record_heartbeat(
            request.account_id,
            request.status,
            request.device_status,
            request.seen_at,
        )
        .await?;
    Ok(())
}
