//! Service modules for Momentum.
//!
//! - [`board`] - lane grouping and optimistic drag transitions
//! - [`ticket_editor`] - create/edit form handling
//! - [`sprint_plan`] - planner response normalization and sprint commit
//! - [`workflow`] - HTTP client for the n8n workflows
//! - [`config`] - workflow endpoint configuration
//! - [`store`] - ticket persistence seam over the table store

pub mod board;
pub mod config;
pub mod sprint_plan;
pub mod store;
pub mod ticket_editor;
pub mod workflow;
