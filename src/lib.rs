//! Tenda: content production for a children's biblical video series.
//!
//! Episode ideas and character casts come from an OpenAI assistant, character
//! art from a hosted image API, and everything is tracked in a Google
//! spreadsheet. Every remote generation goes through the [`poller`]: submit
//! once, then check status on a fixed cadence within a bounded budget.

pub mod cli;
pub mod config;
pub mod error;
mod http;
pub mod image;
pub mod openai;
pub mod poller;
pub mod records;
pub mod sheets;
pub mod studio;
pub mod ui;
