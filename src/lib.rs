pub mod catalog;
pub mod config;
pub mod cost;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod hash;
pub mod naming;
pub mod probe;
pub mod render;
pub mod store;
pub mod validate;
