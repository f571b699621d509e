//! Grammar and style compliance reports

pub mod checker;
pub mod service;

pub use checker::GrammarChecker;
pub use service::ComplianceService;
