//! HTTP/WebSocket front end for the `tourney_poker` coordinator.
//!
//! Bots register over HTTP, spectators watch over WebSocket, and one
//! coordinator task behind an [`api::AppState`] runs the tournaments.

pub mod api;
pub mod config;
