pub mod reconciliation;
pub mod server;
