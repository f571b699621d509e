//! Text generation: Mistral client, prompt templates, and the rewrite service

pub mod mistral;
pub mod prompt;
pub mod rewrite;

pub use mistral::MistralClient;
pub use prompt::PromptBuilder;
pub use rewrite::Rewriter;
