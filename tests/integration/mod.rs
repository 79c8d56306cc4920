//! Integration tests for research-replay
//!
//! These tests verify that multiple components work together correctly.

#[path = "../common/mod.rs"]
pub mod common;

pub mod properties;
pub mod reconstruction;
pub mod rendering;
pub mod session_loading;
