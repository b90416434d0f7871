//! Fitness intake: staged conversational profile collection with voice input.

pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod voice;
pub mod workout;
