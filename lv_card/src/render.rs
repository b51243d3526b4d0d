use crate::CardError;
use crate::assets::CardAssets;
use crate::color::{CardColor, TRACK_COLOR};
use crate::layout::{self, Area, CardLayout};
use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::io::Cursor;

const NAME_SCALE: f32 = 40.0;
const RANK_LABEL_SCALE: f32 = 40.0;
const RANK_SCALE: f32 = 60.0;
const STATS_SCALE: f32 = 35.0;
const PERCENT_SCALE: f32 = 30.0;
/// The avatar mask is drawn this many times larger then shrunk, smoothing its edge.
const MASK_SUPERSAMPLE: u32 = 3;

/// Everything needed to draw one member's card.
///
/// Images are kept as undecoded bytes so decoding happens on the same blocking worker as
/// the drawing.
#[derive(Debug, Clone)]
pub struct CardInput {
    pub display_name: String,
    pub rank: i64,
    pub level: i64,
    pub xp: i64,
    pub xp_max: i64,
    pub avatar: Vec<u8>,
    /// `None` draws the bundled default background.
    pub background: Option<Vec<u8>>,
    pub bar_color: CardColor,
    pub font_color: CardColor,
}

/// Renders the card and encodes it as a JPEG.
///
/// This is CPU bound, async callers should run it through `spawn_blocking`.
pub fn render_card(assets: &CardAssets, input: &CardInput) -> Result<Vec<u8>, CardError> {
    let layout = CardLayout::default();

    let custom_background = decode_background(input.background.as_deref())?;
    let background = custom_background.as_ref().unwrap_or(&assets.background);
    let avatar = image::load_from_memory(&input.avatar)?;

    let mut canvas = fit_background(&layout, background);
    paste_avatar(&mut canvas, &layout, &avatar);
    draw_progress(&mut canvas, &layout, input.xp, input.xp_max, input.bar_color);
    draw_text(&mut canvas, &layout, assets, input);

    encode_jpeg(canvas)
}

fn decode_background(bytes: Option<&[u8]>) -> Result<Option<DynamicImage>, CardError> {
    bytes
        .map(|bytes| image::load_from_memory(bytes).map_err(CardError::Background))
        .transpose()
}

fn fit_background(layout: &CardLayout, background: &DynamicImage) -> RgbaImage {
    background
        .resize_exact(layout.width, layout.height, FilterType::Triangle)
        .to_rgba8()
}

/// An anti-aliased disc filling a `size` square.
#[must_use]
pub fn circle_mask(size: u32) -> GrayImage {
    let big = size * MASK_SUPERSAMPLE;
    let mut mask = GrayImage::new(big, big);
    let half = (big / 2) as i32;
    draw_filled_circle_mut(&mut mask, (half, half), half, Luma([255]));

    imageops::resize(&mask, size, size, FilterType::Lanczos3)
}

fn paste_avatar(canvas: &mut RgbaImage, layout: &CardLayout, avatar: &DynamicImage) {
    let area = layout.avatar;
    let mut avatar = avatar
        .resize_exact(area.width, area.height, FilterType::Lanczos3)
        .to_rgba8();
    let mask = circle_mask(area.width);

    for (pixel, coverage) in avatar.pixels_mut().zip(mask.pixels()) {
        let alpha = u16::from(pixel.0[3]) * u16::from(coverage.0[0]) / 255;
        pixel.0[3] = alpha as u8;
    }

    imageops::overlay(canvas, &avatar, i64::from(area.x), i64::from(area.y));
}

/// Draws the muted track, then the filled portion on top of it.
pub fn draw_progress(
    canvas: &mut RgbaImage,
    layout: &CardLayout,
    xp: i64,
    xp_max: i64,
    bar_color: CardColor,
) {
    draw_capsule(canvas, layout.track, layout.track.width, TRACK_COLOR.rgba());

    let filled = layout.filled_length(xp, xp_max);
    if filled > 0 {
        draw_capsule(canvas, layout.track, filled, bar_color.rgba());
    }
}

/// A bar of `length` starting at the track's origin with half circle caps on both ends.
fn draw_capsule(canvas: &mut RgbaImage, track: Area, length: u32, color: Rgba<u8>) {
    let radius = (track.height / 2) as i32;
    let center_y = track.y + radius;

    if length > 0 {
        draw_filled_rect_mut(
            canvas,
            Rect::at(track.x, track.y).of_size(length, track.height),
            color,
        );
    }
    draw_filled_circle_mut(canvas, (track.x, center_y), radius, color);
    draw_filled_circle_mut(canvas, (track.x + length as i32, center_y), radius, color);
}

fn draw_text(canvas: &mut RgbaImage, layout: &CardLayout, assets: &CardAssets, input: &CardInput) {
    let color = input.font_color.rgba();
    let header_y = layout.header_y();

    // rank, right aligned on the header row
    let rank = format!("#{}", input.rank);
    let (rank_w, _) = text_size(RANK_SCALE, &assets.heavy, &rank);
    let rank_x = layout.text_right() - rank_w as i32;
    draw_text_mut(canvas, color, rank_x, header_y - 8, RANK_SCALE, &assets.heavy, &rank);

    let (label_w, _) = text_size(RANK_LABEL_SCALE, &assets.regular, "Rank:");
    let label_x = rank_x - label_w as i32 - 10;
    draw_text_mut(canvas, color, label_x, header_y + 4, RANK_LABEL_SCALE, &assets.regular, "Rank:");

    // name takes whatever is left of the header row
    let name_room = (label_x - layout.text_left() - 20).max(0) as u32;
    let name = fit_text(&assets.regular, NAME_SCALE, &input.display_name, name_room);
    draw_text_mut(canvas, color, layout.text_left(), header_y + 4, NAME_SCALE, &assets.regular, &name);

    // stats row, level furthest right and xp to its left
    let stats_y = layout.stats_y();
    let level = layout::level_text(input.level);
    let (level_w, _) = text_size(STATS_SCALE, &assets.regular, &level);
    let level_x = layout.text_right() - level_w as i32;
    draw_text_mut(canvas, color, level_x, stats_y, STATS_SCALE, &assets.regular, &level);

    let xp = layout::xp_text(input.xp, input.xp_max);
    let (xp_w, _) = text_size(STATS_SCALE, &assets.regular, &xp);
    draw_text_mut(canvas, color, level_x - 40 - xp_w as i32, stats_y, STATS_SCALE, &assets.regular, &xp);

    // percentage, centred on the bar
    let percent = layout::percentage_text(input.xp, input.xp_max);
    let (percent_w, percent_h) = text_size(PERCENT_SCALE, &assets.regular, &percent);
    let (center_x, center_y) = layout.track.center();
    draw_text_mut(
        canvas,
        color,
        center_x - (percent_w / 2) as i32,
        center_y - (percent_h / 2) as i32,
        PERCENT_SCALE,
        &assets.regular,
        &percent,
    );
}

/// Shortens `text` with an ellipsis until it fits in `max_width` pixels.
fn fit_text(font: &FontArc, scale: f32, text: &str, max_width: u32) -> String {
    let scale = PxScale::from(scale);
    if text_size(scale, font, text).0 <= max_width {
        return text.to_owned();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(['…'].iter()).collect();
        if text_size(scale, font, &candidate).0 <= max_width {
            return candidate;
        }
    }

    String::new()
}

fn encode_jpeg(canvas: RgbaImage) -> Result<Vec<u8>, CardError> {
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;

    Ok(bytes)
}
