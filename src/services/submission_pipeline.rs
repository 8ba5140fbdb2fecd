use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Assignment, Submission, SubmissionStatus},
    repositories::{AssignmentRepository, SubmissionRepository},
    services::{
        document_storage::{DocumentStorage, StoredDocument},
        evaluation_service::EvaluationService,
        ocr_client::OcrClient,
    },
};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn validate_pdf(bytes: &[u8], max_bytes: usize) -> AppResult<()> {
    if bytes.is_empty() {
        return Err(AppError::ValidationError("No file uploaded".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::ValidationError(format!(
            "File is larger than the {} byte limit",
            max_bytes
        )));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::ValidationError(
            "Uploaded file is not a PDF".to_string(),
        ));
    }
    Ok(())
}

/// Upload, OCR, grade and persist one student submission.
///
/// Nothing is uploaded until the file and the assignment check out. Once the
/// document is stored, any later failure deletes it again.
pub struct SubmissionPipeline {
    assignments: Arc<dyn AssignmentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    storage: Arc<dyn DocumentStorage>,
    ocr: Arc<dyn OcrClient>,
    evaluation: Arc<EvaluationService>,
    max_upload_bytes: usize,
}

impl SubmissionPipeline {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        storage: Arc<dyn DocumentStorage>,
        ocr: Arc<dyn OcrClient>,
        evaluation: Arc<EvaluationService>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            assignments,
            submissions,
            storage,
            ocr,
            evaluation,
            max_upload_bytes,
        }
    }

    pub async fn submit(
        &self,
        assignment_id: &str,
        student_id: &str,
        file: UploadedFile,
    ) -> AppResult<Submission> {
        validate_pdf(&file.bytes, self.max_upload_bytes)?;

        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

        let stored = self.storage.upload(&file.file_name, file.bytes).await?;

        match self.evaluate_and_store(&assignment, student_id, &stored).await {
            Ok(submission) => Ok(submission),
            Err(err) => {
                self.discard(&stored).await;
                Err(err)
            }
        }
    }

    async fn evaluate_and_store(
        &self,
        assignment: &Assignment,
        student_id: &str,
        stored: &StoredDocument,
    ) -> AppResult<Submission> {
        let raw_text = self.ocr.extract_text(&stored.url).await?;
        if raw_text.is_empty() {
            log::warn!("OCR found no text in {}", stored.storage_id);
        }

        let graded = self
            .evaluation
            .grade_submission(&assignment.rubric, &raw_text, assignment.max_marks)
            .await?;

        let score = assignment.clamp_score(graded.result.score);
        if score != graded.result.score {
            log::warn!(
                "Evaluator score {} for assignment {} is outside [0, {}]; stored {}",
                graded.result.score,
                assignment.id,
                assignment.max_marks,
                score
            );
        }

        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            assignment_id: assignment.id.clone(),
            student_id: student_id.to_string(),
            pdf_url: stored.url.clone(),
            storage_id: stored.storage_id.clone(),
            raw_text,
            score,
            summary: graded.result.summary,
            strengths: graded.result.strengths,
            weaknesses: graded.result.weaknesses,
            llm_raw: graded.raw_response,
            status: SubmissionStatus::Evaluated,
            created_at: Some(Utc::now()),
        };

        let submission = self.submissions.create(submission).await?;
        log::info!(
            "Student {} submitted assignment {} scoring {}",
            student_id,
            assignment.id,
            submission.score
        );
        Ok(submission)
    }

    async fn discard(&self, stored: &StoredDocument) {
        match self.storage.delete(&stored.storage_id).await {
            Ok(()) => log::info!("Removed orphaned document {}", stored.storage_id),
            Err(e) => log::error!(
                "Failed to remove orphaned document {}: {}",
                stored.storage_id,
                e
            ),
        }
    }
}
