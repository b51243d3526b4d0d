use crate::CardError;
use ab_glyph::FontArc;
use image::DynamicImage;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKGROUND: &str = "images/background.jpg";
pub const REGULAR_FONT: &str = "fonts/ABeeZee-Regular.otf";
pub const HEAVY_FONT: &str = "fonts/SourceSansPro-Black.otf";

/// Static resources every card is drawn with, loaded once at startup.
pub struct CardAssets {
    pub background: DynamicImage,
    /// Used for the name, stats and percentage.
    pub regular: FontArc,
    /// Used for the rank number.
    pub heavy: FontArc,
}

impl CardAssets {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CardError> {
        let dir = dir.as_ref();
        tracing::debug!(dir = %dir.display(), "loading card assets");

        let background = image::open(dir.join(DEFAULT_BACKGROUND))?;
        let regular = load_font(dir.join(REGULAR_FONT))?;
        let heavy = load_font(dir.join(HEAVY_FONT))?;

        Ok(CardAssets {
            background,
            regular,
            heavy,
        })
    }
}

fn load_font(path: PathBuf) -> Result<FontArc, CardError> {
    let bytes = std::fs::read(&path).map_err(|source| CardError::Asset {
        path: path.clone(),
        source,
    })?;

    FontArc::try_from_vec(bytes).map_err(|_| CardError::Font(path))
}
