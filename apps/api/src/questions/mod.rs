// Question sets: generation from an uploaded résumé, the interview page that
// presents them, and the raw JSON API.

pub mod document;
pub mod generator;
pub mod handlers;
pub mod prompts;
