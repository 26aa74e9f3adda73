//! Color syntax predicate for color-valued attributes.
//!
//! Accepted forms: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)`, `transparent`, and the CSS basic color keywords.

use serde::{Deserialize, Serialize};
use winnow::ascii::multispace0;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("orange", [255, 165, 0]),
];

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    fn from_bytes(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            a,
        )
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`. The `#` is required.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#')?.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::from_bytes(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::from_bytes(
                short(0)?,
                short(1)?,
                short(2)?,
                f32::from(short(3)?) / 255.0,
            )),
            6 => Some(Self::from_bytes(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::from_bytes(
                long(0)?,
                long(2)?,
                long(4)?,
                f32::from(long(6)?) / 255.0,
            )),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Parse any accepted color syntax.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed);
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower == "transparent" {
            return Some(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        if let Some((_, [r, g, b])) = NAMED.iter().find(|(name, _)| *name == lower) {
            return Some(Self::from_bytes(*r, *g, *b, 1.0));
        }

        let mut input = lower.as_str();
        let color = parse_rgb_function.parse_next(&mut input).ok()?;
        input.is_empty().then_some(color)
    }
}

/// The color-syntax predicate used by the update dispatcher.
pub fn is_valid_color(raw: &str) -> bool {
    Color::parse(raw).is_some()
}

/// Whether an attribute key holds a color.
pub fn is_color_key(key: &str) -> bool {
    key == "color" || key == "background" || key.ends_with("Color")
}

// ─── rgb() / rgba() ──────────────────────────────────────────────────────

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn skip_space(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

fn parse_rgb_function(input: &mut &str) -> ModalResult<Color> {
    let has_alpha = alt(("rgba".value(true), "rgb".value(false))).parse_next(input)?;
    skip_space(input);
    let _ = '('.parse_next(input)?;
    skip_space(input);
    let r = parse_channel(input)?;
    parse_separator(input)?;
    let g = parse_channel(input)?;
    parse_separator(input)?;
    let b = parse_channel(input)?;
    let a = if has_alpha {
        parse_separator(input)?;
        parse_alpha(input)?
    } else {
        1.0
    };
    skip_space(input);
    let _ = ')'.parse_next(input)?;
    skip_space(input);
    Ok(Color::from_bytes(r, g, b, a))
}

fn parse_separator(input: &mut &str) -> ModalResult<()> {
    skip_space(input);
    let _ = ','.parse_next(input)?;
    skip_space(input);
    Ok(())
}

fn parse_channel(input: &mut &str) -> ModalResult<u8> {
    let digits: &str = take_while(1..=3, |c: char| c.is_ascii_digit()).parse_next(input)?;
    digits.parse::<u8>().map_err(|_| backtrack())
}

fn parse_alpha(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    let alpha: f32 = matched.parse().map_err(|_| backtrack())?;
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(backtrack())
    }
}
