//! CLI command implementations
//!
//! `write` is the only command that touches the device. `show` and
//! `convert` work on the register table alone.

mod convert;
mod list;
mod show;
pub mod write;

pub use convert::run_convert;
pub use list::list_programmers;
pub use show::run_show;
pub use write::run_write;
