use std::collections::HashMap;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::QuestionSnapshot,
        dto::{request::SubmittedAnswers, response::QuestionResult},
    },
};

/// Number of answers that equal the stored key exactly. Comparison is
/// case-sensitive and does not trim.
pub fn score_answers(questions: &[QuestionSnapshot], answers: &[String]) -> u32 {
    questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.answer == **answer)
        .count() as u32
}

pub fn percentage_value(score: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (score as f64 / total as f64 * 10000.0).round() / 100.0
}

/// Two-decimal percentage, `"0"` when there is nothing to grade.
pub fn percentage(score: u32, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.2}", percentage_value(score, total))
}

/// Lays the submitted answers out in question order. Questions left
/// unanswered get an empty string.
pub fn align_answers(
    questions: &[QuestionSnapshot],
    submitted: &SubmittedAnswers,
) -> AppResult<Vec<String>> {
    match submitted {
        SubmittedAnswers::Positional(answers) => {
            if answers.len() > questions.len() {
                return Err(AppError::ValidationError(format!(
                    "Received {} answers for {} questions",
                    answers.len(),
                    questions.len()
                )));
            }
            let mut aligned = answers.clone();
            aligned.resize(questions.len(), String::new());
            Ok(aligned)
        }
        SubmittedAnswers::ByQuestion(answered) => {
            let positions: HashMap<&str, usize> = questions
                .iter()
                .enumerate()
                .map(|(i, q)| (q.mcq_id.as_str(), i))
                .collect();

            let mut aligned = vec![String::new(); questions.len()];
            let mut seen = vec![false; questions.len()];

            for item in answered {
                let index = *positions.get(item.question_id.as_str()).ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Question {} is not part of this test",
                        item.question_id
                    ))
                })?;
                if seen[index] {
                    return Err(AppError::ValidationError(format!(
                        "Question {} was answered more than once",
                        item.question_id
                    )));
                }
                seen[index] = true;
                aligned[index] = item.answer.clone();
            }

            Ok(aligned)
        }
    }
}

pub fn question_results(questions: &[QuestionSnapshot], answers: &[String]) -> Vec<QuestionResult> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let your_answer = answers.get(i).cloned().unwrap_or_default();
            QuestionResult {
                question: question.question.clone(),
                correct_answer: question.answer.clone(),
                is_correct: your_answer == question.answer,
                your_answer,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::dto::request::AnsweredQuestion, test_utils::fixtures::snapshots as questions,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_partial_score() {
        let qs = questions(&["A", "B", "C"]);
        let score = score_answers(&qs, &strings(&["A", "X", "C"]));

        assert_eq!(score, 2);
        assert_eq!(percentage(score, qs.len()), "66.67");
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let qs = questions(&["Paris"]);
        assert_eq!(score_answers(&qs, &strings(&["paris"])), 0);
    }

    #[test]
    fn test_empty_topic_percentage() {
        assert_eq!(score_answers(&[], &[]), 0);
        assert_eq!(percentage(0, 0), "0");
        assert_eq!(percentage_value(0, 0), 0.0);
    }

    #[test]
    fn test_full_marks_percentage() {
        assert_eq!(percentage(4, 4), "100.00");
        assert_eq!(percentage(1, 8), "12.50");
    }

    #[test]
    fn test_align_by_question_id() {
        let qs = questions(&["A", "B", "C"]);
        let submitted = SubmittedAnswers::ByQuestion(vec![
            AnsweredQuestion {
                question_id: "q3".into(),
                answer: "C".into(),
            },
            AnsweredQuestion {
                question_id: "q1".into(),
                answer: "A".into(),
            },
        ]);

        let aligned = align_answers(&qs, &submitted).unwrap();
        assert_eq!(aligned, strings(&["A", "", "C"]));
    }

    #[test]
    fn test_align_rejects_unknown_question() {
        let qs = questions(&["A"]);
        let submitted = SubmittedAnswers::ByQuestion(vec![AnsweredQuestion {
            question_id: "q9".into(),
            answer: "A".into(),
        }]);

        assert!(matches!(
            align_answers(&qs, &submitted),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_align_rejects_duplicate_answers() {
        let qs = questions(&["A", "B"]);
        let answer = AnsweredQuestion {
            question_id: "q1".into(),
            answer: "A".into(),
        };
        let submitted = SubmittedAnswers::ByQuestion(vec![answer.clone(), answer]);

        assert!(align_answers(&qs, &submitted).is_err());
    }

    #[test]
    fn test_align_positional_pads_short_lists() {
        let qs = questions(&["A", "B", "C"]);
        let aligned = align_answers(&qs, &SubmittedAnswers::Positional(strings(&["A"]))).unwrap();

        assert_eq!(aligned, strings(&["A", "", ""]));
    }

    #[test]
    fn test_align_positional_rejects_extra_answers() {
        let qs = questions(&["A"]);
        let result = align_answers(&qs, &SubmittedAnswers::Positional(strings(&["A", "B"])));

        assert!(result.is_err());
    }

    #[test]
    fn test_question_results() {
        let qs = questions(&["A", "B"]);
        let results = question_results(&qs, &strings(&["A", ""]));

        assert!(results[0].is_correct);
        assert!(!results[1].is_correct);
        assert_eq!(results[1].your_answer, "");
        assert_eq!(results[1].correct_answer, "B");
    }
}
