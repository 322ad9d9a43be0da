//! Integration tests for the sitemap engine

mod cli_commands;
mod config_integration;
mod editor_scenarios;
mod generation_pool;
mod link_workflow;
mod store_integration;
mod test_utils;
