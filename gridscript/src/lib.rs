//! `gridscript`: a small line-oriented scripting language whose statements
//! drive asynchronous host commands, plus a reference grid host.

pub mod cli;
pub mod command;
pub mod config;
pub mod grid;
pub mod script;
pub mod var;
