pub mod catalog;
pub mod config;
pub mod demo_data;
pub mod feed;
pub mod http_client;
pub mod logging;
pub mod provider;
pub mod rating;
pub mod squad;
pub mod state;
