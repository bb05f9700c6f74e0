//! Command line interface.

pub mod build;
pub mod completions;
pub mod locate;
pub mod run;
pub mod utils;
