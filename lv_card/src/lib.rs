#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

//! Rank card rendering, independent of Discord and the database.

pub mod assets;
pub mod color;
pub mod layout;
pub mod render;

pub use assets::CardAssets;
pub use color::CardColor;
pub use image::ImageError;
pub use render::{CardInput, render_card};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("could not read card asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not a usable font", .0.display())]
    Font(PathBuf),
    /// The member's own background, as opposed to the avatar or the bundled one.
    #[error("custom background could not be decoded: {0}")]
    Background(image::ImageError),
    #[error("image could not be decoded or encoded: {0}")]
    Image(#[from] image::ImageError),
}
