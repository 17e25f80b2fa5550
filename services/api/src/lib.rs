pub mod adapters;
pub mod config;
pub mod error;
pub mod jobs;
pub mod prompts;
pub mod reply;
pub mod startup;
pub mod web;
