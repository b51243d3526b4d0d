#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

use lv_core::structs::{Command, Context, Error};

mod leveling;
mod meta;

#[must_use]
pub fn commands() -> Vec<Command> {
    meta::commands()
        .into_iter()
        .chain(leveling::commands())
        .collect()
}
