#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub mod appearance;
pub mod card;
pub mod config;
pub mod db;
mod error;
pub mod fetch;
pub mod leveling;
pub mod structs;

pub use error::LevelError;
