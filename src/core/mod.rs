//! Configuration and provider wiring shared by the demos and the dispatch function

pub mod config;
pub mod resource;
