use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::{require_teacher, AuthenticatedUser},
    errors::AppError,
    models::dto::request::CreateTopicRequest,
};

#[post("/topics")]
pub async fn create_topic(
    state: web::Data<AppState>,
    request: web::Json<CreateTopicRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let response = state
        .topic_service
        .create(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

// Public; answer keys only for teachers.
#[get("/topics")]
pub async fn list_topics(
    state: web::Data<AppState>,
    auth: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let reveal_answers = auth.map(|a| a.0.is_teacher()).unwrap_or(false);

    let topics = state.topic_service.list(reveal_answers).await?;
    Ok(HttpResponse::Ok().json(json!({ "topics": topics })))
}

#[get("/topics/my")]
pub async fn my_topics(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let topics = state.topic_service.list_for_teacher(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "topics": topics })))
}
