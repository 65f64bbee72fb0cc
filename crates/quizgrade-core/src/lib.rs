//! quizgrade-core: Prompt formatting, response parsing, and grading.
//!
//! This crate defines the quiz answer data model, turns answers into a
//! grading prompt, and turns the model's free-text reply back into one
//! verdict per answer.

pub mod error;
pub mod evaluation;
pub mod grader;
pub mod model;
pub mod prompt;
pub mod report;
pub mod settings;
pub mod similarity;
pub mod traits;
