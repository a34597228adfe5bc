pub mod client;
pub mod config;
pub mod corpus;
pub mod data_loader;
pub mod errors;
pub mod llm;
pub mod relevance;
pub mod render;
pub mod search;
pub mod server;
pub mod services;
pub mod session;
pub mod visualization;
