//! Command handlers for the x4vro CLI

pub mod configure;
pub mod extract;
pub mod run;
