//! Terminal client for a remote Klondike rules service.
//!
//! The server owns every rule. This crate turns gestures into move requests,
//! keeps the latest authoritative snapshot and renders it.

pub mod card;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod game;
pub mod gesture;
pub mod hint;
pub mod moves;
pub mod overlay;
pub mod profile;
pub mod renderer;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod telemetry;
pub mod view;
