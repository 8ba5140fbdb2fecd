use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::TestAttempt,
};

pub fn require_teacher(claims: &Claims) -> AppResult<()> {
    if !claims.is_teacher() {
        return Err(AppError::Forbidden(
            "Only teachers can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_student(claims: &Claims) -> AppResult<()> {
    if !claims.is_student() {
        return Err(AppError::Forbidden(
            "Only students can perform this action".to_string(),
        ));
    }
    Ok(())
}

/// Teachers see every attempt; students only their own.
pub fn can_view_test_attempt(claims: &Claims, attempt: &TestAttempt) -> bool {
    claims.is_teacher() || claims.sub == attempt.student_id
}
