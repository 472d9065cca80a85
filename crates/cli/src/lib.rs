//! Twincell fonts CLI library.

pub mod cli;
