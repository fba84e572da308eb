//! List commands implementation

use crate::programmers;

/// List all device backends compiled into this binary
pub fn list_programmers() {
    print!("{}", programmers::programmer_help());
}
