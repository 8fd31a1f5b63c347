pub mod catalog;
pub mod config;
pub mod consts;
pub mod endpoint;
pub mod logging;
pub mod post;
pub mod publisher;
pub mod scheduler;
pub mod search;
pub mod server;
pub mod social;
pub mod store;
