pub mod client;
pub mod filter;
pub mod paths;
pub mod ranking;
pub mod state;
pub mod store;
pub mod sync;
