//! fileman: an interactive command-line file manager.
//!
//! A single [`repl::Repl`] owns a [`session::Session`] and dispatches one
//! line at a time through the [`commands::CommandTable`]. File data always
//! moves through bounded chunks, see [`transfer`] and [`hash`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod hash;
pub mod listing;
pub mod os_info;
pub mod path;
pub mod repl;
pub mod session;
pub mod transfer;

pub use error::{FmError, Result};
pub use repl::{CloseReason, Repl};
pub use session::Session;
