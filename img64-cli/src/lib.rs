// ABOUTME: Library exports for the img64 CLI modules for testing and external use
// ABOUTME: Makes internal modules available to integration tests

pub mod app;
pub mod cli;
pub mod config;
