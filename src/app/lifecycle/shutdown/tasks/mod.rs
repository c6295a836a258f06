pub mod stop_server;
