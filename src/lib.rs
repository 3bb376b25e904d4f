pub mod config;
pub mod dashboard;
pub mod error;
pub mod http_cache;
pub mod http_client;
pub mod logging;
pub mod records;
pub mod rounds;
pub mod source;
pub mod table;
pub mod trends;
