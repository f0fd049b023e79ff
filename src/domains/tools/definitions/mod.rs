//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod go;
pub mod hello_world;

pub use go::{DocCommand, GodocOutput, GodocParams, GodocTool};
pub use hello_world::{HelloWorldOutput, HelloWorldParams, HelloWorldTool};
