//! Search fan-out across gateway hosts and indexers.

mod orchestrator;
mod topk;
mod types;

pub use orchestrator::SearchOrchestrator;
pub use topk::TopK;
pub use types::*;
