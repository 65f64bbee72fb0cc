//! Offline answer matching.
//!
//! A word-overlap heuristic used when no grading service is available.

use crate::model::{Outcome, QuizAnswer, Verdict};

/// Share of significant answer words the player must hit.
const MATCH_RATIO: f64 = 0.7;

/// Words this short are ignored when comparing.
const MIN_WORD_LEN: usize = 3;

fn normalize(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `user_answer` is close enough to `correct_answer`.
pub fn check_answer_similarity(user_answer: &str, correct_answer: &str) -> bool {
    if user_answer.is_empty() || correct_answer.is_empty() {
        return false;
    }

    let user = normalize(user_answer);
    let correct = normalize(correct_answer);

    if user == correct {
        return true;
    }

    let correct_words: Vec<&str> = correct
        .split(' ')
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect();
    let user_words: Vec<&str> = user.split(' ').filter(|w| !w.is_empty()).collect();

    if correct_words.is_empty() {
        return user.contains(&correct);
    }

    let matched = correct_words
        .iter()
        .filter(|word| {
            user_words
                .iter()
                .any(|u| u.contains(*word) || word.contains(u))
        })
        .count();

    matched as f64 / correct_words.len() as f64 >= MATCH_RATIO
}

/// Grade answers with [`check_answer_similarity`]. Verdicts carry no justification.
pub fn grade_locally(answers: &[QuizAnswer]) -> Vec<Verdict> {
    answers
        .iter()
        .map(|a| {
            let result = if check_answer_similarity(&a.user_answer, &a.correct_answer) {
                Outcome::Correct
            } else {
                Outcome::Incorrect
            };
            Verdict::for_answer(a, result, None)
        })
        .collect()
}
