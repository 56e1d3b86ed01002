pub mod client;
pub mod fetcher;
pub mod sentiment;
pub mod types;
