//! Notification API handlers
//!
//! Routes under `/api/notifications`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use pm_contracts::notifications::{NotificationContract, NotificationParams};
use pm_contracts::Contract;
use pm_core::Id;
use pm_db::{CreateNotificationDto, NotificationRepository, UserRepository};

use super::ensure_task_in_organization;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, AppState, AuthenticatedUser, JsonBody};
use crate::representers::{NotificationRepresentation, People};

const LIST_LIMIT: i64 = 50;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let notifications = NotificationRepository::new(pool.clone())
        .list_for_recipient(user.id, user.organization_id, LIST_LIMIT)
        .await?;
    let people = People::load(
        pool,
        user.organization_id,
        notifications.iter().map(|n| n.sender_id),
    )
    .await?;

    let notifications: Vec<NotificationRepresentation> = notifications
        .into_iter()
        .map(|n| NotificationRepresentation::represent(n, &people))
        .collect();
    Ok(Json(notifications))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;

    let pool = state.pool()?;
    let notification = NotificationRepository::new(pool.clone())
        .mark_read(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification"))?;

    let people = People::load(pool, user.organization_id, [notification.sender_id]).await?;
    Ok(Json(NotificationRepresentation::represent(notification, &people)))
}

/// POST /api/notifications
///
/// Without an explicit recipient the notification goes to an admin of the
/// sender's organization.
pub async fn create_notification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(params): JsonBody<NotificationParams>,
) -> ApiResult<impl IntoResponse> {
    user.require_org_member()?;
    NotificationContract.validate(&params)?;

    let pool = state.pool()?;
    let users = UserRepository::new(pool.clone());
    let recipient = match params.recipient_id {
        Some(recipient_id) => users
            .find_in_organization(recipient_id, user.organization_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Recipient must belong to your organization"))?,
        None => users
            .find_admin_in_organization(user.organization_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("No recipient found for notification"))?,
    };
    if let Some(task_id) = params.task_id {
        ensure_task_in_organization(pool, user.organization_id, task_id).await?;
    }

    let notification = NotificationRepository::new(pool.clone())
        .create(CreateNotificationDto {
            recipient_id: recipient.id,
            sender_id: user.id,
            organization_id: user.organization_id,
            kind: params.kind.unwrap_or_default(),
            title: params.title.as_deref().unwrap_or_default().trim().to_string(),
            message: params.message.as_deref().unwrap_or_default().trim().to_string(),
            task_id: params.task_id,
        })
        .await?;

    tracing::debug!(notification_id = %notification.id, recipient_id = %recipient.id, "Notification sent");

    let people = People::load(pool, user.organization_id, [notification.sender_id]).await?;
    Ok((
        StatusCode::CREATED,
        Json(NotificationRepresentation::represent(notification, &people)),
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use pm_db::PgPool;
    use serde_json::json;

    #[sqlx::test(migrations = "../pm-db/migrations")]
    async fn test_task_reference_stays_inside_organization(pool: PgPool) {
        let app = TestApp::new(pool);
        let admin = app.organization("acme").await;
        let rival = app.organization("rival").await;

        let (_, body) = app
            .send("POST", "/api/tasks", &rival, Some(json!({ "title": "Secret plan" })))
            .await;
        let rival_task = body["task"]["id"].clone();

        let (status, body) = app
            .send(
                "POST",
                "/api/notifications",
                &admin,
                Some(json!({ "title": "Report", "message": "Done", "taskId": rival_task })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Task must belong to your organization");

        let (_, body) = app
            .send("POST", "/api/tasks", &admin, Some(json!({ "title": "Own work" })))
            .await;
        let own_task = body["task"]["id"].clone();
        let (status, body) = app
            .send(
                "POST",
                "/api/notifications",
                &admin,
                Some(json!({ "title": "Report", "message": "Done", "taskId": own_task })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["taskId"], own_task);
    }
}
