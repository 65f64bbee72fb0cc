//! Grading response parser.
//!
//! Maps the free-text reply of a grading model back onto the submitted
//! answers. Two reply shapes are understood:
//!
//! - **plain**: consecutive `Question:` blocks (the default)
//! - **delimited**: blocks introduced by `===QUESTION <n>===`, chosen whenever
//!   the reply contains `===QUESTION`
//!
//! Blocks are matched to answers by position. Only the result and the
//! justification are read from a block; the verdict always carries the
//! submitted question and answers. If the reply cannot cover every answer,
//! the whole batch falls back to "Incorrect" verdicts.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseFailure;
use crate::model::{Outcome, QuizAnswer, Verdict};

/// Substring that switches parsing to the delimited format.
pub const DELIMITED_MARKER: &str = "===QUESTION";

/// Justification used when a block does not carry one.
pub const DEFAULT_JUSTIFICATION: &str = "Evaluation completed";

static QUESTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Question:").expect("valid question label regex"));

static QUESTION_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)===QUESTION \d+===").expect("valid delimiter regex"));

static QUESTION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Question:\s*(.+?)(?:\nCorrect Answer:|$)").expect("valid question regex")
});

static CORRECT_ANSWER_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Correct Answer:\s*(.+?)(?:\nUser Answer:|$)")
        .expect("valid correct answer regex")
});

static USER_ANSWER_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)User Answer:\s*(.+?)(?:\nResult:|$)").expect("valid user answer regex")
});

static RESULT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Result:\s*(Correct|Incorrect)").expect("valid result regex")
});

// A plain justification ends at the first blank line.
static PLAIN_JUSTIFICATION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Justification:\s*(.+?)(?:\n\n|$)").expect("valid justification regex")
});

static DELIMITED_JUSTIFICATION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Justification:\s*(.+?)(?:\n===|$)").expect("valid justification regex")
});

/// Shape of a grading reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Plain,
    Delimited,
}

impl ResponseFormat {
    /// Pick the format for a raw reply.
    pub fn detect(raw: &str) -> Self {
        if raw.contains(DELIMITED_MARKER) {
            ResponseFormat::Delimited
        } else {
            ResponseFormat::Plain
        }
    }

    fn justification_field(self) -> &'static Regex {
        match self {
            ResponseFormat::Plain => &PLAIN_JUSTIFICATION_FIELD,
            ResponseFormat::Delimited => &DELIMITED_JUSTIFICATION_FIELD,
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFormat::Plain => write!(f, "plain"),
            ResponseFormat::Delimited => write!(f, "delimited"),
        }
    }
}

/// Fields scraped from one question block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub user_answer: Option<String>,
    pub result: Outcome,
    pub justification: String,
}

/// Result of parsing a reply, including how it was read.
#[derive(Debug, Clone)]
pub struct ParsedEvaluation {
    /// The format the reply was read as.
    pub format: ResponseFormat,
    /// One verdict per submitted answer, in submission order.
    pub verdicts: Vec<Verdict>,
    /// Set when the fallback verdicts were used.
    pub failure: Option<ParseFailure>,
}

impl ParsedEvaluation {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// Split a reply into non-empty question blocks.
pub fn split_blocks(raw: &str, format: ResponseFormat) -> Vec<&str> {
    let blocks: Vec<&str> = match format {
        ResponseFormat::Delimited => QUESTION_DELIMITER.split(raw).collect(),
        ResponseFormat::Plain => {
            // Each block keeps its own `Question:` label.
            let mut blocks = Vec::new();
            let mut start = 0;
            for m in QUESTION_LABEL.find_iter(raw) {
                if m.start() > start {
                    blocks.push(&raw[start..m.start()]);
                }
                start = m.start();
            }
            blocks.push(&raw[start..]);
            blocks
        }
    };

    blocks
        .into_iter()
        .filter(|b| !b.trim().is_empty())
        .collect()
}

/// Extract the labelled fields from one block.
pub fn parse_block(block: &str, format: ResponseFormat) -> ParsedBlock {
    let result = capture(&RESULT_FIELD, block)
        .and_then(|r| r.parse::<Outcome>().ok())
        .unwrap_or(Outcome::Incorrect);

    let justification = capture(format.justification_field(), block)
        .filter(|j| !j.is_empty())
        .unwrap_or_else(|| DEFAULT_JUSTIFICATION.to_string());

    ParsedBlock {
        question: capture(&QUESTION_FIELD, block),
        correct_answer: capture(&CORRECT_ANSWER_FIELD, block),
        user_answer: capture(&USER_ANSWER_FIELD, block),
        result,
        justification,
    }
}

fn capture(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Parse a reply, reporting a failure instead of falling back.
pub fn try_parse_evaluation(
    raw: &str,
    answers: &[QuizAnswer],
) -> Result<Vec<Verdict>, ParseFailure> {
    if answers.is_empty() {
        return Ok(Vec::new());
    }
    if raw.trim().is_empty() {
        return Err(ParseFailure::EmptyResponse);
    }

    let text = raw.replace("\r\n", "\n");
    let format = ResponseFormat::detect(&text);
    let blocks = split_blocks(&text, format);

    if blocks.len() < answers.len() {
        return Err(ParseFailure::MissingBlocks {
            expected: answers.len(),
            found: blocks.len(),
        });
    }
    if blocks.len() > answers.len() {
        tracing::debug!(
            "discarding {} extra {format} blocks",
            blocks.len() - answers.len()
        );
    }

    let verdicts = blocks
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(i, (block, answer))| {
            let parsed = parse_block(block, format);
            if let Some(question) = &parsed.question {
                if !question.eq_ignore_ascii_case(answer.question.trim()) {
                    tracing::debug!(
                        position = i + 1,
                        "block question {question:?} differs from submitted {:?}",
                        answer.question
                    );
                }
            }
            Verdict::for_answer(answer, parsed.result, Some(parsed.justification))
        })
        .collect();

    Ok(verdicts)
}

/// One "Incorrect" verdict per answer, used when a reply cannot be parsed.
pub fn fallback_verdicts(answers: &[QuizAnswer]) -> Vec<Verdict> {
    answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            Verdict::for_answer(
                answer,
                Outcome::Incorrect,
                Some(format!("Parsing failed - Question {}", i + 1)),
            )
        })
        .collect()
}

/// Parse a reply and keep track of how it was read.
pub fn analyze_response(raw: &str, answers: &[QuizAnswer]) -> ParsedEvaluation {
    let format = ResponseFormat::detect(raw);
    match try_parse_evaluation(raw, answers) {
        Ok(verdicts) => ParsedEvaluation {
            format,
            verdicts,
            failure: None,
        },
        Err(e) => {
            tracing::warn!("failed to parse {format} evaluation response: {e}");
            ParsedEvaluation {
                format,
                verdicts: fallback_verdicts(answers),
                failure: Some(e),
            }
        }
    }
}

/// Parse a reply into one verdict per answer. Never fails.
pub fn parse_evaluation(raw: &str, answers: &[QuizAnswer]) -> Vec<Verdict> {
    analyze_response(raw, answers).verdicts
}
