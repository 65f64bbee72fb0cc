//! Console rendering of verdicts.

use comfy_table::{Cell, Color, Table};

use quizgrade_core::model::Verdict;
use quizgrade_core::report::score_percent;

pub fn print_verdicts(verdicts: &[Verdict]) {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Question",
        "Correct Answer",
        "Your Answer",
        "Result",
        "Justification",
    ]);

    for (i, verdict) in verdicts.iter().enumerate() {
        let result_color = if verdict.is_correct() {
            Color::Green
        } else {
            Color::Red
        };
        let user_answer = if verdict.user_answer.trim().is_empty() {
            "(no answer)"
        } else {
            verdict.user_answer.as_str()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&verdict.question),
            Cell::new(&verdict.correct_answer),
            Cell::new(user_answer),
            Cell::new(verdict.result).fg(result_color),
            Cell::new(verdict.justification.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
}

pub fn print_score(verdicts: &[Verdict]) {
    let correct = verdicts.iter().filter(|v| v.is_correct()).count();
    let total = verdicts.len();
    println!(
        "\nScore: {correct}/{total} ({}%)",
        score_percent(correct, total)
    );
}
