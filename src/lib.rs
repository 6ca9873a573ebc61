//! chatbox is a terminal chat client for the text-generation models hosted on
//! Cloudflare Workers AI.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the model catalog, the session
//!   controller state machine, and the inference and persistence gateways.
//! - [`ui`] renders the terminal interface and runs the event loop that
//!   feeds input and background results into the controller.
//! - [`api`] defines the Workers AI request and response payloads.
//! - [`cli`] parses arguments and dispatches subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
