//! Card geometry.
//!
//! Everything is derived from the canvas size: the avatar fills the card's height minus a
//! margin, the progress track hangs off the avatar's right edge and every text anchor is
//! expressed relative to those two boxes.

pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 240;

const MARGIN: u32 = 20;
/// Gap between the avatar and the start of the track.
const TRACK_GAP: u32 = 40;
/// Space left between the end of the track and the right edge of the card.
const TRACK_END_PADDING: u32 = 50;

/// An axis aligned box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    #[must_use]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    #[must_use]
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,
    pub avatar: Area,
    pub track: Area,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl CardLayout {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let avatar_size = height.saturating_sub(MARGIN * 2).max(1);
        let avatar = Area {
            x: MARGIN as i32,
            y: MARGIN as i32,
            width: avatar_size,
            height: avatar_size,
        };

        let track_height = (avatar_size / 5).max(2);
        let track_x = avatar.right() + TRACK_GAP as i32;
        let track_end = (width.saturating_sub(TRACK_END_PADDING) as i32).max(track_x + 1);
        let track = Area {
            x: track_x,
            y: avatar.bottom() - track_height as i32 - MARGIN as i32,
            width: (track_end - track_x) as u32,
            height: track_height,
        };

        CardLayout {
            width,
            height,
            avatar,
            track,
        }
    }

    /// Radius of the half circles capping both ends of the track.
    #[must_use]
    pub fn cap_radius(&self) -> i32 {
        (self.track.height / 2) as i32
    }

    /// Length in pixels of the filled part of the track.
    ///
    /// `xp` is clamped into `0..=xp_max`, a non-positive `xp_max` yields an empty bar.
    #[must_use]
    pub fn filled_length(&self, xp: i64, xp_max: i64) -> u32 {
        if xp_max <= 0 {
            return 0;
        }
        let xp = xp.clamp(0, xp_max) as u128;
        let xp_max = xp_max as u128;
        let track = u128::from(self.track.width);

        // rounded to the nearest pixel
        ((track * xp * 2 + xp_max) / (xp_max * 2)) as u32
    }

    /// Baseline row for the name and rank, near the top of the card.
    #[must_use]
    pub fn header_y(&self) -> i32 {
        self.avatar.y + (self.avatar.height / 10) as i32
    }

    /// Row above the track holding the XP fraction and level.
    #[must_use]
    pub fn stats_y(&self) -> i32 {
        self.track.y - self.track.height as i32 - 10
    }

    /// Left edge for text aligned with the track's start.
    #[must_use]
    pub fn text_left(&self) -> i32 {
        self.track.x - self.cap_radius()
    }

    /// Right edge for text aligned with the track's end.
    #[must_use]
    pub fn text_right(&self) -> i32 {
        self.track.right() + self.cap_radius()
    }
}

/// Whole percent of progress towards the next level, rounded down.
#[must_use]
pub fn percentage(xp: i64, xp_max: i64) -> u32 {
    if xp_max <= 0 {
        return 0;
    }
    (xp.clamp(0, xp_max) as u128 * 100 / xp_max as u128) as u32
}

#[must_use]
pub fn percentage_text(xp: i64, xp_max: i64) -> String {
    format!("{}%", percentage(xp, xp_max))
}

#[must_use]
pub fn xp_text(xp: i64, xp_max: i64) -> String {
    format!("XP: {xp}/{xp_max}")
}

#[must_use]
pub fn level_text(level: i64) -> String {
    format!("Level: {level}")
}
