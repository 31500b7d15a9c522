pub mod server;
pub mod upload;
