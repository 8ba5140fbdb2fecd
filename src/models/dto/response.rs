use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    Assignment, Mcq, QuestionSnapshot, Submission, SubmissionStatus, TestAnalysis, TestAttempt,
    Topic, User, UserRole,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        UserDto {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Name and email only, for embedding in other entities.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub evaluation_prompt: String,
    pub max_marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub teacher_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AssignmentView {
    pub fn new(assignment: Assignment, teacher: Option<UserSummary>) -> Self {
        AssignmentView {
            id: assignment.id,
            title: assignment.title,
            description: assignment.description,
            evaluation_prompt: assignment.rubric,
            max_marks: assignment.max_marks,
            due_date: assignment.due_date,
            teacher_id: assignment.teacher_id,
            teacher,
            created_at: assignment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserSummary>,
    pub pdf_url: String,
    pub raw_text: String,
    pub score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub llm_raw: String,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SubmissionView {
    pub fn new(submission: Submission, student: Option<UserSummary>) -> Self {
        SubmissionView {
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            student,
            pdf_url: submission.pdf_url,
            raw_text: submission.raw_text,
            score: submission.score,
            summary: submission.summary,
            strengths: submission.strengths,
            weaknesses: submission.weaknesses,
            llm_raw: submission.llm_raw,
            status: submission.status,
            created_at: submission.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McqView {
    pub id: String,
    pub topic_id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Withheld from anyone who could still be tested on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl McqView {
    pub fn new(mcq: Mcq, reveal_answer: bool) -> Self {
        McqView {
            id: mcq.id,
            topic_id: mcq.topic_id,
            question: mcq.question,
            options: mcq.options,
            answer: reveal_answer.then_some(mcq.answer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub num_questions: u32,
    pub created_by: String,
    pub mcqs: Vec<McqView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TopicView {
    pub fn new(topic: Topic, mcqs: Vec<McqView>) -> Self {
        TopicView {
            id: topic.id,
            title: topic.title,
            description: topic.description,
            num_questions: topic.num_questions,
            created_by: topic.created_by,
            mcqs,
            created_at: topic.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicResponse {
    pub topic: TopicView,
    pub mcqs: Vec<McqView>,
    pub questions_generated: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
}

impl From<&Topic> for TopicSummary {
    fn from(topic: &Topic) -> Self {
        TopicSummary {
            id: topic.id.clone(),
            title: topic.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestionView {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl TestQuestionView {
    fn new(snapshot: &QuestionSnapshot, reveal_answer: bool) -> Self {
        TestQuestionView {
            id: snapshot.mcq_id.clone(),
            question: snapshot.question.clone(),
            options: snapshot.options.clone(),
            answer: reveal_answer.then(|| snapshot.answer.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_tips: Vec<String>,
}

impl From<TestAnalysis> for AnalysisView {
    fn from(analysis: TestAnalysis) -> Self {
        AnalysisView {
            summary: analysis.summary,
            strengths: analysis.strengths,
            weaknesses: analysis.weaknesses,
            improvement_tips: analysis.improvement_tips,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAttemptView {
    pub id: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserSummary>,
    pub topic_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicSummary>,
    pub questions: Vec<TestQuestionView>,
    pub answers: Vec<String>,
    pub score: u32,
    pub total: usize,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestAttemptView {
    /// Answer keys are only shown once the attempt is completed.
    pub fn new(
        attempt: TestAttempt,
        student: Option<UserSummary>,
        topic: Option<TopicSummary>,
    ) -> Self {
        let reveal = attempt.completed;
        TestAttemptView {
            questions: attempt
                .questions
                .iter()
                .map(|q| TestQuestionView::new(q, reveal))
                .collect(),
            total: attempt.questions.len(),
            id: attempt.id,
            student_id: attempt.student_id,
            student,
            topic_id: attempt.topic_id,
            topic,
            answers: attempt.answers,
            score: attempt.score,
            completed: attempt.completed,
            analysis: attempt.analysis.map(AnalysisView::from),
            created_at: attempt.created_at,
            completed_at: attempt.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,
    pub correct_answer: String,
    pub your_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicSummary>,
    pub score: u32,
    pub total: usize,
    pub percentage: String,
    /// Set when the attempt has no questions to grade against.
    pub malformed_topic: bool,
    pub details: Vec<QuestionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestWithReport {
    pub test: TestAttemptView,
    pub report: TestReport,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicPerformance {
    pub topic_id: String,
    pub title: String,
    pub attempts: usize,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestAnalytics {
    pub total_tests: usize,
    pub average_percentage: f64,
    pub pass_rate: f64,
    pub topic_performance: Vec<TopicPerformance>,
}
