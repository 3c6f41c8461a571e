//! Panels drawn by the dashboard.
//!
//! - [`HostPanel`]: one bordered block per host
//! - [`TitleBar`] / [`StatusBar`]: the first and last terminal rows

pub mod bars;
pub mod host;

pub use bars::{StatusBar, TitleBar, TITLE};
pub use host::HostPanel;
