use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use validator::Validate;

use crate::{
    auth::{can_view_test_attempt, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{QuestionSnapshot, TestAttempt},
        dto::{
            request::SubmitTestRequest,
            response::{
                AnalysisView, TestAnalytics, TestAttemptView, TestReport, TestWithReport,
                TopicPerformance, TopicSummary, UserSummary,
            },
        },
    },
    repositories::{TestAttemptRepository, TopicRepository, UserRepository},
    services::{
        evaluation_service::EvaluationService,
        lookups::user_summaries,
        scoring::{align_answers, percentage, percentage_value, question_results, score_answers},
        topic_service::TopicService,
    },
};

const PASS_PERCENTAGE: f64 = 50.0;

pub struct TestService {
    tests: Arc<dyn TestAttemptRepository>,
    topics: Arc<dyn TopicRepository>,
    users: Arc<dyn UserRepository>,
    topic_service: Arc<TopicService>,
    evaluation: Arc<EvaluationService>,
    allow_retakes: bool,
}

impl TestService {
    pub fn new(
        tests: Arc<dyn TestAttemptRepository>,
        topics: Arc<dyn TopicRepository>,
        users: Arc<dyn UserRepository>,
        topic_service: Arc<TopicService>,
        evaluation: Arc<EvaluationService>,
        allow_retakes: bool,
    ) -> Self {
        Self {
            tests,
            topics,
            users,
            topic_service,
            evaluation,
            allow_retakes,
        }
    }

    /// Freezes the topic's current questions into a new attempt.
    pub async fn start(&self, student_id: &str, topic_id: &str) -> AppResult<TestAttemptView> {
        let topic = self.topic_service.find(topic_id).await?;

        if !self.allow_retakes && self.tests.has_completed_attempt(student_id, topic_id).await? {
            return Err(AppError::Conflict(
                "You have already completed this test".to_string(),
            ));
        }

        let questions: Vec<QuestionSnapshot> = self
            .topic_service
            .questions_of(&topic)
            .await?
            .iter()
            .map(QuestionSnapshot::from)
            .collect();
        if questions.is_empty() {
            log::warn!("Starting test on topic {} which has no questions", topic.id);
        }

        let attempt = self
            .tests
            .create(TestAttempt::start(student_id, &topic.id, questions))
            .await?;
        log::info!(
            "Student {} started test {} on topic {}",
            student_id,
            attempt.id,
            topic.id
        );

        Ok(TestAttemptView::new(
            attempt,
            None,
            Some(TopicSummary::from(&topic)),
        ))
    }

    /// Grades against the attempt's own snapshot. Analysis failures are
    /// logged and leave the attempt without analysis.
    pub async fn submit(
        &self,
        student_id: &str,
        request: SubmitTestRequest,
    ) -> AppResult<TestWithReport> {
        request.validate()?;

        let mut attempt = self
            .tests
            .find_by_id(&request.test_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

        if attempt.student_id != student_id {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }
        if attempt.completed {
            return Err(AppError::Conflict("Test already submitted".to_string()));
        }

        let answers = align_answers(&attempt.questions, &request.answers)?;
        let score = score_answers(&attempt.questions, &answers);
        let total = attempt.total_questions();

        let topic = self.topics.find_by_id(&attempt.topic_id).await?;
        let topic_title = topic
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or("Unknown topic");

        let analysis = if total == 0 {
            None
        } else {
            let results = question_results(&attempt.questions, &answers);
            match self
                .evaluation
                .analyze_test(topic_title, total, score, &results)
                .await
            {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    log::warn!("Test analysis for {} failed: {}", attempt.id, e);
                    None
                }
            }
        };

        attempt.complete(answers, score, analysis);
        self.tests.complete_if_pending(&attempt).await?;
        log::info!(
            "Student {} submitted test {} scoring {}/{}",
            student_id,
            attempt.id,
            score,
            total
        );

        Ok(build_report(
            attempt,
            None,
            topic.as_ref().map(TopicSummary::from),
        ))
    }

    pub async fn my_reports(&self, student_id: &str) -> AppResult<Vec<TestAttemptView>> {
        let attempts = self.tests.find_completed_by_student(student_id).await?;
        let topics = self.topic_summaries(&attempts).await?;

        Ok(attempts
            .into_iter()
            .map(|a| {
                let topic = topics.get(&a.topic_id).cloned();
                TestAttemptView::new(a, None, topic)
            })
            .collect())
    }

    pub async fn teacher_reports(&self) -> AppResult<Vec<TestAttemptView>> {
        let attempts = self.tests.find_all_completed().await?;
        let topics = self.topic_summaries(&attempts).await?;
        let students = user_summaries(
            self.users.as_ref(),
            attempts.iter().map(|a| a.student_id.as_str()),
        )
        .await?;

        Ok(attempts
            .into_iter()
            .map(|a| {
                let topic = topics.get(&a.topic_id).cloned();
                let student = students.get(&a.student_id).cloned();
                TestAttemptView::new(a, student, topic)
            })
            .collect())
    }

    pub async fn get(&self, claims: &Claims, test_id: &str) -> AppResult<TestWithReport> {
        let attempt = self
            .tests
            .find_by_id(test_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

        if !can_view_test_attempt(claims, &attempt) {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        let topic = self
            .topics
            .find_by_id(&attempt.topic_id)
            .await?
            .map(|t| TopicSummary::from(&t));
        let student = self
            .users
            .find_by_id(&attempt.student_id)
            .await?
            .map(|u| UserSummary::from(&u));

        Ok(build_report(attempt, student, topic))
    }

    pub async fn analytics(&self) -> AppResult<TestAnalytics> {
        let attempts = self.tests.find_all_completed().await?;
        let topics = self.topic_summaries(&attempts).await?;
        Ok(compute_analytics(&attempts, &topics))
    }

    async fn topic_summaries(
        &self,
        attempts: &[TestAttempt],
    ) -> AppResult<HashMap<String, TopicSummary>> {
        let mut ids: Vec<String> = attempts.iter().map(|a| a.topic_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let topics = self.topics.find_by_ids(&ids).await?;
        Ok(topics
            .iter()
            .map(|t| (t.id.clone(), TopicSummary::from(t)))
            .collect())
    }
}

/// Per-question results are only disclosed once the attempt is completed.
pub fn build_report(
    attempt: TestAttempt,
    student: Option<UserSummary>,
    topic: Option<TopicSummary>,
) -> TestWithReport {
    let total = attempt.total_questions();
    let details = if attempt.completed {
        question_results(&attempt.questions, &attempt.answers)
    } else {
        Vec::new()
    };

    let report = TestReport {
        student: student.clone(),
        topic: topic.clone(),
        score: attempt.score,
        total,
        percentage: percentage(attempt.score, total),
        malformed_topic: total == 0,
        details,
        analysis: attempt.analysis.clone().map(AnalysisView::from),
    };

    TestWithReport {
        test: TestAttemptView::new(attempt, student, topic),
        report,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn compute_analytics(
    attempts: &[TestAttempt],
    topics: &HashMap<String, TopicSummary>,
) -> TestAnalytics {
    if attempts.is_empty() {
        return TestAnalytics {
            total_tests: 0,
            average_percentage: 0.0,
            pass_rate: 0.0,
            topic_performance: Vec::new(),
        };
    }

    let percentages: Vec<(&str, f64)> = attempts
        .iter()
        .map(|a| {
            (
                a.topic_id.as_str(),
                percentage_value(a.score, a.total_questions()),
            )
        })
        .collect();

    let total_tests = percentages.len();
    let sum: f64 = percentages.iter().map(|(_, p)| p).sum();
    let passed = percentages
        .iter()
        .filter(|(_, p)| *p >= PASS_PERCENTAGE)
        .count();

    let mut per_topic: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (topic_id, pct) in &percentages {
        per_topic.entry(*topic_id).or_default().push(*pct);
    }

    let mut topic_performance: Vec<TopicPerformance> = per_topic
        .into_iter()
        .map(|(topic_id, values)| TopicPerformance {
            topic_id: topic_id.to_string(),
            title: topics
                .get(topic_id)
                .map(|t| t.title.clone())
                .unwrap_or_else(|| "Unknown topic".to_string()),
            attempts: values.len(),
            average_percentage: round2(values.iter().sum::<f64>() / values.len() as f64),
        })
        .collect();
    topic_performance.sort_by(|a, b| a.title.cmp(&b.title));

    TestAnalytics {
        total_tests,
        average_percentage: round2(sum / total_tests as f64),
        pass_rate: round2(passed as f64 / total_tests as f64 * 100.0),
        topic_performance,
    }
}
