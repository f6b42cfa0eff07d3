//! Betagen - pose estimation jobs for climbing videos
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod jobs;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod storage;
