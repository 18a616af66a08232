//! Library components of the `npsych` command-line tool.

pub mod config;
pub mod logging;
pub mod pipeline;
