//! greenmerge - merge pull requests once CI is green
//!
//! Two kinds of request are supported:
//! - "merge when green": wait until GitHub reports the PR as mergeable and
//!   clean, then merge it
//! - "run job X then merge": dispatch a CI job for the PR's head commit,
//!   then fall into the same wait-and-merge flow
//!
//! Pending requests live in an [`registry::AttemptRegistry`]; the
//! [`scheduler::Scheduler`] re-evaluates them until each one merges, is
//! rejected, or times out.

pub mod auth;
pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod merge;
pub mod platform;
pub mod registry;
pub mod scheduler;
pub mod types;
