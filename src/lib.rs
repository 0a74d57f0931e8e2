pub mod compdb;
pub mod config;
pub mod edit;
pub mod eligibility;
pub mod errors;
pub mod frontend;
pub mod inputs;
pub mod model;
pub mod reorder;
pub mod service;
pub mod source;
pub mod writer;

// Re-export commonly used types
pub use errors::ReorderError;
pub use service::{FileReport, ReorderService, RunSummary};
