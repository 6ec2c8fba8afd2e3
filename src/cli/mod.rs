//! Terminal front end: the interactive shell and its table output.

pub mod outputformatter;
pub mod shell;

pub use outputformatter::{print_json, print_table, render_table, Table};
pub use shell::{split_args, Reply, Shell, HELP};
