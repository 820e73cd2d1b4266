//! Integration tests for flowdoc generation, transport and configuration

mod assist_endpoints;
mod config_integration;
mod model_providers;
mod sequencer_flow;
