pub mod merge_service;
pub mod assembly_service;
pub mod generate_service;

pub use merge_service::{MergeOptions, MergeOutcome, MergeService};
pub use assembly_service::FeedAssembler;
pub use generate_service::{FeedGenerator, GenerateRequest};
