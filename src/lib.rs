//! Poari - a minimal board view for issues across multiple projects
//!
//! Issues from GitHub and GitLab projects are pivoted into a column × row
//! board whose axes are picked from state, label, assignee and milestone.

pub mod app;
pub mod board;
pub mod config;
pub mod data;
pub mod error;
pub mod integrations;
pub mod store;
pub mod util;
