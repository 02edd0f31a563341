//! Caption and song-suggestion generator for uploaded photos.
//!
//! A photo plus mood/language selections is turned into an instruction for a
//! multimodal model. Generation falls back across an ordered list of models
//! until one returns parseable captions and songs.

pub mod ai;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod request;
pub mod server;
pub mod style;

pub use error::{Error, Result};
