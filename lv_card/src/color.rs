use image::Rgba;
use std::str::FromStr;

/// Colour used for the progress bar when a user never picked one.
pub const DEFAULT_BAR_COLOR: &str = "#11ebf2";
/// Colour used for card text when a user never picked one.
pub const DEFAULT_FONT_COLOR: &str = "#fff";
/// Base colour of the empty progress track.
pub const TRACK_COLOR: CardColor = CardColor(Rgba([0x72, 0x71, 0x75, 0xff]));

static HEX: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"^#?([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

const NAMED: &[(&str, [u8; 3])] = &[
    ("white", [0xff, 0xff, 0xff]),
    ("black", [0x00, 0x00, 0x00]),
    ("red", [0xff, 0x00, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("teal", [0x00, 0x80, 0x80]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
];

/// A colour a user can pick for their rank card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardColor(pub Rgba<u8>);

/// Error returned when a colour string is neither hex nor a known name.
#[derive(Debug, thiserror::Error)]
#[error("`{0}` is not a colour, try a hex code like #11ebf2")]
pub struct InvalidColor(pub String);

impl CardColor {
    /// Parses `value`, falling back to `default` when it is not a colour.
    ///
    /// Used at render time so that rows written before validation existed still render.
    #[must_use]
    pub fn parse_or(value: &str, default: &str) -> Self {
        value
            .parse::<CardColor>()
            .or_else(|_| default.parse::<CardColor>())
            .unwrap_or(CardColor(Rgba([0xff, 0xff, 0xff, 0xff])))
    }

    #[must_use]
    pub fn rgba(self) -> Rgba<u8> {
        self.0
    }
}

impl FromStr for CardColor {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some((_, rgb)) = NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(CardColor(Rgba([rgb[0], rgb[1], rgb[2], 0xff])));
        }

        let Some(caps) = HEX.captures(trimmed) else {
            return Err(InvalidColor(s.to_owned()));
        };
        let digits = caps.get(1).map_or("", |m| m.as_str());

        // short forms double every nibble, #1af -> #11aaff
        let expanded: String = if digits.len() <= 4 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_owned()
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16);
        let alpha = if expanded.len() == 8 { channel(3) } else { Ok(0xff) };

        match (channel(0), channel(1), channel(2), alpha) {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(CardColor(Rgba([r, g, b, a]))),
            _ => Err(InvalidColor(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            "#11ebf2".parse::<CardColor>().unwrap(),
            CardColor(Rgba([0x11, 0xeb, 0xf2, 0xff]))
        );
        assert_eq!(
            "fff".parse::<CardColor>().unwrap(),
            CardColor(Rgba([0xff, 0xff, 0xff, 0xff]))
        );
        assert_eq!(
            "#1a2b3c80".parse::<CardColor>().unwrap(),
            CardColor(Rgba([0x1a, 0x2b, 0x3c, 0x80]))
        );
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(
            "Teal".parse::<CardColor>().unwrap(),
            CardColor(Rgba([0x00, 0x80, 0x80, 0xff]))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12345".parse::<CardColor>().is_err());
        assert!("not a colour".parse::<CardColor>().is_err());
        assert!("#ggg".parse::<CardColor>().is_err());
    }

    #[test]
    fn invalid_stored_value_falls_back() {
        assert_eq!(
            CardColor::parse_or("rgb(1,2,3)", DEFAULT_BAR_COLOR),
            "#11ebf2".parse::<CardColor>().unwrap()
        );
    }
}
