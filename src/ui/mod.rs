//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! - [`chat_loop`]: the main interaction loop that turns key presses into
//!   [`crate::core::app::AppAction`]s and runs answer fetches via
//!   [`crate::core::fetch_service`].
//! - [`renderer`] and [`layout`]: frame composition.
//! - [`markdown`]: transcript messages to styled lines.
//! - [`theme`]: color and style policy.

pub mod chat_loop;
pub mod layout;
pub mod markdown;
pub mod renderer;
pub mod theme;
