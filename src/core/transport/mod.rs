pub mod client_context;
