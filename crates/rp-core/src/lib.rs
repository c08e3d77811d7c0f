//! Core types and definitions for the Ravaged Planets simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, orders, commands, events, state snapshots, error kinds,
//! configuration, logging, and constants. It has no dependency on any
//! rendering, audio, or GUI framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod logging;
pub mod orders;
pub mod state;
pub mod types;
