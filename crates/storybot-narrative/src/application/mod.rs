//! Session controller: command and query handlers that talk to the content
//! repository and the save store around the pure narrative core.

pub mod command_handlers;
pub mod query_handlers;
