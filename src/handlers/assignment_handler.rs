use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use futures::TryStreamExt;
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::{require_student, require_teacher, AuthenticatedUser},
    errors::AppError,
    models::dto::{request::CreateAssignmentRequest, response::SubmissionView},
    services::submission_pipeline::UploadedFile,
};

const FILE_FIELDS: [&str; 2] = ["pdf", "file"];

#[post("/assignments")]
pub async fn create_assignment(
    state: web::Data<AppState>,
    request: web::Json<CreateAssignmentRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let assignment = state
        .assignment_service
        .create(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "assignment": assignment })))
}

#[get("/assignments/my")]
pub async fn my_assignments(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let assignments = state.assignment_service.list_for_teacher(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "assignments": assignments })))
}

#[get("/assignments")]
pub async fn list_assignments(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let assignments = state.assignment_service.list_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "assignments": assignments })))
}

#[post("/assignments/{id}/submit")]
pub async fn submit_assignment(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Multipart,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let file = read_pdf_field(payload, state.config.max_upload_bytes).await?;
    let submission = state
        .submission_pipeline
        .submit(&id, &auth.0.sub, file)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "submission": SubmissionView::new(submission, None)
    })))
}

#[get("/assignments/{id}/submissions")]
pub async fn assignment_submissions(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_teacher(&auth.0)?;

    let submissions = state.assignment_service.list_submissions(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "submissions": submissions })))
}

/// Buffers the first file field, refusing to read past `max_bytes`.
async fn read_pdf_field(mut payload: Multipart, max_bytes: usize) -> Result<UploadedFile, AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {}", e)))?
    {
        let is_file = field
            .name()
            .map(|name| FILE_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
            .unwrap_or_else(|| "submission.pdf".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::ValidationError(format!("Failed to read upload: {}", e)))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::ValidationError(format!(
                    "File is larger than the {} byte limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile { file_name, bytes });
    }

    Err(AppError::ValidationError("No file uploaded".to_string()))
}
