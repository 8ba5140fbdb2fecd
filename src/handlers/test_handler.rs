use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_student, require_teacher, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{StartTestRequest, SubmitTestRequest},
};

#[post("/tests/start")]
pub async fn start_test(
    state: web::Data<AppState>,
    request: web::Json<StartTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;
    request.validate()?;

    let test = state
        .test_service
        .start(&auth.0.sub, &request.topic_id)
        .await?;
    Ok(HttpResponse::Created().json(json!({ "test": test })))
}

#[post("/tests/submit")]
pub async fn submit_test(
    state: web::Data<AppState>,
    request: web::Json<SubmitTestRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let result = state
        .test_service
        .submit(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/tests/my-reports")]
pub async fn my_reports(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let tests = state.test_service.my_reports(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "tests": tests })))
}

#[get("/tests/teacher/reports")]
pub async fn teacher_reports(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let tests = state.test_service.teacher_reports().await?;
    Ok(HttpResponse::Ok().json(json!({ "tests": tests })))
}

#[get("/tests/teacher/analytics")]
pub async fn teacher_analytics(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let analytics = state.test_service.analytics().await?;
    Ok(HttpResponse::Ok().json(json!({ "analytics": analytics })))
}

#[get("/tests/{id}")]
pub async fn get_test(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state.test_service.get(&auth.0, &id).await?;
    Ok(HttpResponse::Ok().json(result))
}
