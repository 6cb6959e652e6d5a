//! Line-oriented front-end over the library: command parsing plus the shell
//! that runs each command against one session.

mod commands;
mod shell;

pub use commands::{parse_command, Command, EvaluationForm, HELP};
pub use shell::{Reply, Shell};
