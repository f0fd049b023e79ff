pub mod command;
pub mod doc;

pub use command::{DocCommand, DocFailure, DocRun};
pub use doc::{GodocOutput, GodocParams, GodocTool};
