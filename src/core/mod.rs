pub mod bootstrap;
pub mod config_manager;
pub mod identity;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod transport;
pub mod upstream;
