pub const GRADING_PROMPT: &str = "You are an experienced teacher grading a student's written answer against the teacher's rubric.

### Rules:

- Grade strictly according to the rubric below. Do not invent criteria.
- The score must be a number between 0 and the maximum marks, inclusive.
- Strengths and weaknesses are short, concrete observations about this answer.
- The student text was produced by OCR, so ignore obvious recognition artefacts.

### Output:

Strict JSON ONLY. Do NOT add explanation. NO markdown. NO backticks.

Return EXACTLY this structure:
{
  \"score\": number,
  \"summary\": \"string\",
  \"strengths\": [\"string\"],
  \"weaknesses\": [\"string\"]
}";

pub const MCQ_GENERATION_PROMPT: &str = "You are an expert educator writing multiple-choice questions for a classroom test.

### Rules:

- Every question tests one fact or concept from the topic below.
- Every question has exactly 4 options, and exactly one of them is correct.
- The answer field repeats the correct option text exactly, character for character.
- Distractors are plausible but unambiguously wrong.
- Do not number the options and do not prefix them with letters.

### Output:

Strict JSON ONLY. Do NOT add explanation. NO markdown. NO backticks.

Return a JSON array where each element has EXACTLY this structure:
{
  \"question\": \"string\",
  \"options\": [\"string\", \"string\", \"string\", \"string\"],
  \"answer\": \"string\"
}";

pub const TEST_ANALYSIS_PROMPT: &str = "You are a supportive tutor reviewing a student's multiple-choice test result.

### Rules:

- Base every observation on the per-question results below.
- Strengths name concepts the student clearly understands.
- Weaknesses name concepts the student got wrong or skipped.
- Improvement tips are specific, actionable study suggestions.

### Output:

Strict JSON ONLY. Do NOT add explanation. NO markdown. NO backticks.

Return EXACTLY this structure:
{
  \"summary\": \"string\",
  \"strengths\": [\"string\"],
  \"weaknesses\": [\"string\"],
  \"improvementTips\": [\"string\"]
}";

pub fn grading_prompt(rubric: &str, student_text: &str, max_marks: f64) -> String {
    format!(
        "{}\n\nTeacher rubric:\n{}\n\nMax marks = {}\n\nStudent answer:\n{}\n",
        GRADING_PROMPT, rubric, max_marks, student_text
    )
}

pub fn mcq_generation_prompt(title: &str, description: &str, count: u32) -> String {
    format!(
        "{}\n\nTopic: {}\nDescription: {}\n\nGenerate exactly {} questions.\n",
        MCQ_GENERATION_PROMPT, title, description, count
    )
}

pub fn test_analysis_prompt(topic: &str, total: usize, score: u32, results_json: &str) -> String {
    format!(
        "{}\n\nTopic: {}\nScore: {} out of {}\n\nPer-question results:\n{}\n",
        TEST_ANALYSIS_PROMPT, topic, score, total, results_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_prompt_carries_inputs() {
        let prompt = grading_prompt("10 points per definition", "Ownership means...", 30.0);

        assert!(prompt.contains("10 points per definition"));
        assert!(prompt.contains("Ownership means..."));
        assert!(prompt.contains("Max marks = 30"));
    }

    #[test]
    fn mcq_prompt_requests_count() {
        let prompt = mcq_generation_prompt("Rust", "Borrowing", 5);
        assert!(prompt.contains("Generate exactly 5 questions."));
    }
}
