// Interview submission: transcript persistence and evaluation.

pub mod evaluator;
pub mod handlers;
pub mod prompts;
pub mod transcript;
