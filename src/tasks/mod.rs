pub mod digest_scheduler;
pub mod types;
