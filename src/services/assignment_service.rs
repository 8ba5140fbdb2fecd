use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::Assignment,
        dto::{
            request::CreateAssignmentRequest,
            response::{AssignmentView, SubmissionView},
        },
    },
    repositories::{AssignmentRepository, SubmissionRepository, UserRepository},
    services::lookups::user_summaries,
};

pub struct AssignmentService {
    assignments: Arc<dyn AssignmentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    users: Arc<dyn UserRepository>,
}

impl AssignmentService {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            assignments,
            submissions,
            users,
        }
    }

    pub async fn create(
        &self,
        teacher_id: &str,
        request: CreateAssignmentRequest,
    ) -> AppResult<AssignmentView> {
        request.validate()?;

        let assignment = Assignment::new(
            request.title.trim(),
            &request.description,
            teacher_id,
            &request.evaluation_prompt,
            request.max_marks,
            request.due_date,
        );
        let assignment = self.assignments.create(assignment).await?;
        log::info!("Teacher {} created assignment {}", teacher_id, assignment.id);

        Ok(AssignmentView::new(assignment, None))
    }

    pub async fn list_for_teacher(&self, teacher_id: &str) -> AppResult<Vec<AssignmentView>> {
        let assignments = self.assignments.list_by_teacher(teacher_id).await?;
        Ok(assignments
            .into_iter()
            .map(|a| AssignmentView::new(a, None))
            .collect())
    }

    pub async fn list_all(&self) -> AppResult<Vec<AssignmentView>> {
        let assignments = self.assignments.list_all().await?;
        let teachers = user_summaries(
            self.users.as_ref(),
            assignments.iter().map(|a| a.teacher_id.as_str()),
        )
        .await?;

        Ok(assignments
            .into_iter()
            .map(|a| {
                let teacher = teachers.get(&a.teacher_id).cloned();
                AssignmentView::new(a, teacher)
            })
            .collect())
    }

    pub async fn list_submissions(&self, assignment_id: &str) -> AppResult<Vec<SubmissionView>> {
        if self.assignments.find_by_id(assignment_id).await?.is_none() {
            return Err(AppError::NotFound("Assignment not found".to_string()));
        }

        let submissions = self.submissions.list_by_assignment(assignment_id).await?;
        log::info!(
            "Found {} submissions for assignment {}",
            submissions.len(),
            assignment_id
        );

        let students = user_summaries(
            self.users.as_ref(),
            submissions.iter().map(|s| s.student_id.as_str()),
        )
        .await?;

        Ok(submissions
            .into_iter()
            .map(|s| {
                let student = students.get(&s.student_id).cloned();
                SubmissionView::new(s, student)
            })
            .collect())
    }
}
