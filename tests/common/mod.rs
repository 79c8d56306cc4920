//! Shared test utilities for research-replay
//!
//! - Entity/graph builders and session export fixtures
//! - A scheduler that records every schedule/cancel call
//! - TUI rendering helpers on ratatui's TestBackend

#![allow(dead_code)]

pub mod fixtures;
