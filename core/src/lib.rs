pub mod api;
pub mod backend;
pub mod capability;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod health;
pub mod orchestrator;
pub mod planner;
pub mod router;
pub mod task;
