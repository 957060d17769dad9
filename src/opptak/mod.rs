// SPDX-License-Identifier: MIT

pub mod config;
pub mod fixture;
pub mod orchestrator;
pub mod qualification;
pub mod rules;
pub mod server;

pub use config::EngineConfig;
pub use orchestrator::{PathwayDecision, PathwayEvaluator, PathwayExplanation};
