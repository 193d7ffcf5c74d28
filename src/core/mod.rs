//! Runtime core: the controller and its background loops.
//!
//! The public API from this module is [`Controller`] (with its
//! [`ControllerBuilder`]) and the OS signal helpers.
//!
//! Internal modules:
//! - [`accounting`]: single owner of the job counters, decides shutdown and drain;
//! - [`collector`]: gathers job errors in completion order, fires finish;
//! - [`runner`]: runs one job body with panic isolation;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`controller`]: launching API, lifecycle, order-restorer hand-out.

mod accounting;
mod builder;
mod collector;
mod controller;
mod runner;
mod shutdown;

pub use builder::ControllerBuilder;
pub use controller::Controller;
pub use shutdown::{ShutdownSignals, wait_for_shutdown_signal};
