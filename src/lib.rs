//! Haven Companion - Recovery Companion Backend
//!
//! This crate implements a staged recovery-companion conversation: a per-user
//! dialogue that moves through a fixed cycle of stages, extracts structured
//! wellness data from free text, and derives streak-based milestones.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
