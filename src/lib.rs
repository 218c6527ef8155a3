pub mod agents;
pub mod backend;
pub mod banner;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod events;
pub mod prompts;
pub mod scoring;
pub mod spinner;
pub mod web;
