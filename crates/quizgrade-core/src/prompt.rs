//! Grading prompt templates and formatting.

use crate::model::QuizAnswer;

/// Marker replaced by the numbered list of answers.
pub const QUESTIONS_PLACEHOLDER: &str = "{QUESTIONS_PLACEHOLDER}";

/// Shown in place of an answer the player left blank.
pub const EMPTY_ANSWER: &str = "(empty)";

/// Plain rubric: one `Question:` block per answer.
pub const PLAIN_RUBRIC: &str = "You are an intelligent assistant that helps evaluate quiz answers. A user has submitted answers to a quiz, and you are to compare them with the correct answers.

Rules:
- Accept minor spelling or grammar mistakes.
- Accept answers even if they are lowercase or uppercase.
- Accept answers if they are semantically equivalent or meaningfully close.
- If the answer is clearly incorrect, mark it as wrong.

For each question, output EXACTLY this format:

Question: <question>
Correct Answer: <system_answer>
User Answer: <user_answer>
Result: Correct / Incorrect
Justification: <short explanation>

Here is the list:

{QUESTIONS_PLACEHOLDER}";

/// Delimited rubric: blocks separated by `===QUESTION n===`, justifications in Serbian.
pub const DELIMITED_RUBRIC: &str = "You are an intelligent assistant that helps evaluate quiz answers. A user has submitted answers to a quiz, and you are to compare them with the correct answers.

Rules:
- Accept minor spelling or grammar mistakes.
- Accept answers even if they are lowercase or uppercase.
- Accept answers if they are semantically equivalent or meaningfully close.
- If the answer is clearly incorrect, mark it as wrong.
- Write all justifications in Serbian language.

CRITICAL: You MUST follow this EXACT format for EACH question. Do NOT mix questions together:

===QUESTION 1===
Question: [copy the exact question text]
Correct Answer: [copy the exact correct answer]
User Answer: [copy the exact user answer]
Result: Correct / Incorrect
Justification: [short explanation in Serbian]

===QUESTION 2===
Question: [copy the exact question text]
Correct Answer: [copy the exact correct answer]
User Answer: [copy the exact user answer]
Result: Correct / Incorrect
Justification: [short explanation in Serbian]

Continue this pattern for ALL questions. Each question must be separated by ===QUESTION X=== where X is the question number.

Here is the list:

{QUESTIONS_PLACEHOLDER}";

/// Render the numbered answer list that replaces the placeholder.
pub fn format_questions(answers: &[QuizAnswer]) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let user_answer = if a.is_blank() {
                EMPTY_ANSWER
            } else {
                a.user_answer.as_str()
            };
            format!(
                "{}. Question: {}\n   Correct Answer: {}\n   User Answer: {}",
                i + 1,
                a.question,
                a.correct_answer,
                user_answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Substitute the first placeholder in `template` with the answer list.
///
/// A template without the placeholder is returned unchanged.
pub fn format_prompt(template: &str, answers: &[QuizAnswer]) -> String {
    if !has_placeholder(template) {
        return template.to_string();
    }
    template.replacen(QUESTIONS_PLACEHOLDER, &format_questions(answers), 1)
}

/// Whether `template` contains the answer-list placeholder.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(QUESTIONS_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> Vec<QuizAnswer> {
        vec![
            QuizAnswer::new("What is the capital of France?", "Paris", "paris"),
            QuizAnswer::new("What color is the sky?", "Blue", "t"),
        ]
    }

    #[test]
    fn numbered_listing() {
        let listing = format_questions(&answers());
        assert_eq!(
            listing,
            "1. Question: What is the capital of France?\n   Correct Answer: Paris\n   User Answer: paris\n\n\
             2. Question: What color is the sky?\n   Correct Answer: Blue\n   User Answer: t"
        );
    }

    #[test]
    fn every_entry_keeps_its_position() {
        let many: Vec<_> = (0..12)
            .map(|i| QuizAnswer::new(format!("q{i}"), "a", "b"))
            .collect();
        let listing = format_questions(&many);
        let entries: Vec<&str> = listing.split("\n\n").collect();
        assert_eq!(entries.len(), 12);
        for (i, entry) in entries.iter().enumerate() {
            assert!(entry.starts_with(&format!("{}. Question: q{i}", i + 1)));
        }
    }

    #[test]
    fn blank_answer_renders_empty_marker() {
        let listing = format_questions(&[QuizAnswer::new("q1", "a", "")]);
        assert!(listing.ends_with("User Answer: (empty)"));
    }

    #[test]
    fn whitespace_answer_is_sent_as_typed() {
        let listing = format_questions(&[
            QuizAnswer::new("q1", "a", "   "),
            QuizAnswer::new("q2", "a", ""),
        ]);
        let entries: Vec<&str> = listing.split("\n\n").collect();
        assert!(entries[0].ends_with("User Answer:    "));
        assert!(entries[1].ends_with("User Answer: (empty)"));
        assert_eq!(listing.matches("(empty)").count(), 1);
    }

    #[test]
    fn replaces_only_first_placeholder() {
        let template = "Intro\n{QUESTIONS_PLACEHOLDER}\nOutro {QUESTIONS_PLACEHOLDER}";
        let prompt = format_prompt(template, &answers());
        assert!(prompt.starts_with("Intro\n1. Question: What is the capital of France?"));
        assert!(prompt.ends_with("Outro {QUESTIONS_PLACEHOLDER}"));
    }

    #[test]
    fn missing_placeholder_is_a_no_op() {
        let template = "Grade these answers please.";
        assert_eq!(format_prompt(template, &answers()), template);
        assert!(!has_placeholder(template));
    }

    #[test]
    fn built_in_rubrics_have_placeholder() {
        assert!(has_placeholder(PLAIN_RUBRIC));
        assert!(has_placeholder(DELIMITED_RUBRIC));
        let prompt = format_prompt(DELIMITED_RUBRIC, &answers());
        assert!(prompt.contains("===QUESTION 1==="));
        assert!(prompt.ends_with("User Answer: t"));
    }

    #[test]
    fn empty_answer_list_leaves_blank_listing() {
        assert_eq!(format_prompt("A\n{QUESTIONS_PLACEHOLDER}", &[]), "A\n");
    }
}
