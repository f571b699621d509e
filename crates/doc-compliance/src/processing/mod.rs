//! Background agent jobs and their persisted records

mod job_store;
mod orchestrator;

pub use job_store::JobStore;
pub use orchestrator::AgentOrchestrator;
