//! Interactive terminal manager for a MongoDB server running in a container.
//!
//! The crate drives two external tools: a container runtime CLI (`docker` by
//! default) and the `mongosh` shell inside the container. The [`Manager`]
//! presents a menu and turns each choice into one or more [`Invocation`]s that
//! a [`CommandRunner`] executes. The log view is the only long-running action;
//! it runs until the container stops or the operator presses Ctrl-C (see
//! [`interrupt`]).
//!
//! Operator input never becomes script text. Values such as passwords are
//! handed to `mongosh` through environment variables, see [`mongosh`].

pub mod command;
pub mod config;
pub mod docker;
pub mod error;
mod external;
pub mod interrupt;
pub mod io_adapters;
mod manager;
pub mod menu;
pub mod mongosh;
pub mod prompt;
#[cfg(unix)]
mod signals;
mod ui;

pub use command::{CommandRunner, Invocation, StreamOutcome};
pub use config::{Args, Config};
pub use error::{CommandError, InputError};
pub use external::{SystemRunner, find_executable};
pub use io_adapters::{MemWriter, ScriptedLines};
pub use manager::{Flow, Manager};
pub use prompt::{LineSource, Terminal};
pub use ui::Reporter;
