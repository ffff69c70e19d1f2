// Library exports for the blog API
// This allows integration tests and the binary to share the same modules

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod repository;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
