//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that turns terminal input and background
//!   results into controller events and executes the resulting commands.
//! - [`renderer`], [`layout`] and [`picker`]: frame composition.
//! - [`theme`]: color and style policy.
//!
//! Ownership boundary: this layer presents state and captures input, while
//! [`crate::core`] owns the conversation and every state transition.

pub mod chat_loop;
pub mod layout;
pub mod picker;
pub mod renderer;
pub mod theme;
