//! beautydesk is a terminal chat client for the PowerMatrix medical-aesthetics
//! customer-service bots.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session, persona selection, configuration and
//!   the one-shot answer fetches against the bot backend.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the request and response payloads of the chat endpoint.
//! - [`utils`] holds transcript logging and width-aware line wrapping.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings and dispatches into
//! [`core::app`] and [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
