//! Core types and definitions for the ABYSS bathymetry core.
//!
//! This crate defines the vocabulary shared across the other crates:
//! coordinates, chunk keys, configuration, sensor state, events and
//! snapshots. It has no dependency on rendering or any runtime framework.

pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
