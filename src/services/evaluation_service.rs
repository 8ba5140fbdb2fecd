use serde_json::Value;
use std::sync::Arc;

use crate::{
    constants::prompts,
    errors::EvaluationError,
    models::{domain::TestAnalysis, dto::response::QuestionResult},
    services::{
        json_extract::{extract_json, JsonShape},
        llm_client::LlmClient,
    },
};

pub const PARSE_FAILURE_SUMMARY: &str = "Error parsing evaluation";
pub const DEFAULT_ANALYSIS_SUMMARY: &str = "No summary available.";
const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub score: f64,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl GradingResult {
    /// Lenient read of the evaluator's object: absent or mistyped fields
    /// fall back to zero/empty instead of failing the whole grade.
    pub fn from_value(value: &Value) -> Self {
        GradingResult {
            score: number_field(value.get("score")),
            summary: value
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            strengths: string_list(value.get("strengths")),
            weaknesses: string_list(value.get("weaknesses")),
        }
    }

    /// What gets stored when the evaluator's output is unusable.
    pub fn parse_failure() -> Self {
        GradingResult {
            score: 0.0,
            summary: PARSE_FAILURE_SUMMARY.to_string(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graded {
    pub result: GradingResult,
    pub raw_response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMcq {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl GeneratedMcq {
    fn from_value(value: &Value) -> Option<Self> {
        let question = value.get("question")?.as_str()?.trim();
        if question.is_empty() {
            return None;
        }

        let options: Vec<String> = value
            .get("options")?
            .as_array()?
            .iter()
            .map(|o| o.as_str().map(|s| s.trim().to_string()))
            .collect::<Option<_>>()?;
        if options.len() != OPTIONS_PER_QUESTION {
            return None;
        }

        let answer = value.get("answer")?.as_str()?.trim().to_string();
        if !options.contains(&answer) {
            return None;
        }

        Some(GeneratedMcq {
            question: question.to_string(),
            options,
            answer,
        })
    }
}

fn number_field(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The three LLM-backed operations. Every one returns `EvaluationError` for
/// collaborator failures; how much a malformed answer is tolerated differs.
pub struct EvaluationService {
    llm: Arc<dyn LlmClient>,
}

impl EvaluationService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Transport failures propagate. Output that holds no usable JSON is
    /// graded as [`GradingResult::parse_failure`] with the raw text kept.
    pub async fn grade_submission(
        &self,
        rubric: &str,
        student_text: &str,
        max_marks: f64,
    ) -> Result<Graded, EvaluationError> {
        let prompt = prompts::grading_prompt(rubric, student_text, max_marks);

        let raw = match self.llm.complete(&prompt).await {
            Ok(raw) => raw,
            Err(EvaluationError::EmptyResponse) => String::new(),
            Err(err) => return Err(err),
        };

        let result = match extract_json(&raw, JsonShape::Object) {
            Ok(value) => GradingResult::from_value(&value),
            Err(e) => {
                log::warn!("Could not read grading response: {}", e);
                GradingResult::parse_failure()
            }
        };

        Ok(Graded {
            result,
            raw_response: raw,
        })
    }

    /// Unusable output yields an empty list. Items that are not a proper
    /// four-option question with a matching answer are dropped.
    pub async fn generate_mcqs(
        &self,
        title: &str,
        description: &str,
        count: u32,
    ) -> Result<Vec<GeneratedMcq>, EvaluationError> {
        let prompt = prompts::mcq_generation_prompt(title, description, count);

        let raw = match self.llm.complete(&prompt).await {
            Ok(raw) => raw,
            Err(EvaluationError::EmptyResponse) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let items = match extract_json(&raw, JsonShape::Array) {
            Ok(Value::Array(items)) => items,
            Ok(_) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read generated questions: {}", e);
                Vec::new()
            }
        };

        let received = items.len();
        let mut mcqs: Vec<GeneratedMcq> =
            items.iter().filter_map(GeneratedMcq::from_value).collect();

        if mcqs.len() < received {
            log::warn!(
                "Dropped {} of {} generated questions for '{}'",
                received - mcqs.len(),
                received,
                title
            );
        }
        mcqs.truncate(count as usize);

        Ok(mcqs)
    }

    pub async fn analyze_test(
        &self,
        topic: &str,
        total: usize,
        score: u32,
        results: &[QuestionResult],
    ) -> Result<TestAnalysis, EvaluationError> {
        let results_json = serde_json::to_string_pretty(results)
            .map_err(|e| EvaluationError::malformed(e.to_string(), String::new()))?;
        let prompt = prompts::test_analysis_prompt(topic, total, score, &results_json);

        let raw = self.llm.complete(&prompt).await?;
        let value = extract_json(&raw, JsonShape::Object)
            .map_err(|e| EvaluationError::malformed(e.to_string(), raw.clone()))?;

        let summary = value
            .get("summary")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_ANALYSIS_SUMMARY)
            .to_string();

        Ok(TestAnalysis {
            summary,
            strengths: string_list(value.get("strengths")),
            weaknesses: string_list(value.get("weaknesses")),
            improvement_tips: string_list(value.get("improvementTips")),
        })
    }
}
