//! Collaborator abstractions for document storage, text extraction, and text generation
//!
//! The agent pipeline and the HTTP layer only talk to these traits, so the
//! local filesystem store and the Mistral client can be swapped for fakes.

pub mod document_store;
pub mod llm;
pub mod local;
pub mod mistral;
pub mod text_extractor;

pub use document_store::DocumentStore;
pub use llm::{GenerationOptions, TextGenerator};
pub use local::LocalDocumentStore;
pub use mistral::MistralGenerator;
pub use text_extractor::TextExtractor;
