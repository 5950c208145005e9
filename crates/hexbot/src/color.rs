use crate::{Error, Result};
use core::{fmt, str::FromStr};

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Formats the color as `#rrggbb` using lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Returns `true` if all three channels are equal, in which case the color
    /// has no defined hue.
    pub const fn is_achromatic(self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses `rrggbb`, `rgb`, `#rrggbb` or `#rgb` (case-insensitive). The
/// three-digit shorthand expands each digit, so `abc` is `aabbcc`.
impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSeed {
            seed: s.to_string(),
        };
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..=i]).map(|v| v * 0x11);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

/// A color in the hue/saturation/lightness model.
///
/// - `hue` is in degrees, `[0, 360)`.
/// - `saturation` and `lightness` are normally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub const fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Converts back to RGB.
    ///
    /// The hue selects one of six faces of the RGB cube (`h' = hue / 60`).
    /// Each channel is truncated and clamped to `[0, 255]`, so out-of-range
    /// lightness or saturation never produces an invalid color.
    pub fn to_rgb(self) -> Rgb {
        let chroma = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let h_prime = self.hue / 60.0;
        let x = chroma * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());

        let (r1, g1, b1) = match h_prime {
            h if (0.0..1.0).contains(&h) => (chroma, x, 0.0),
            h if (1.0..2.0).contains(&h) => (x, chroma, 0.0),
            h if (2.0..3.0).contains(&h) => (0.0, chroma, x),
            h if (3.0..4.0).contains(&h) => (0.0, x, chroma),
            h if (4.0..5.0).contains(&h) => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let m = self.lightness - chroma / 2.0;
        Rgb::new(to_channel(r1 + m), to_channel(g1 + m), to_channel(b1 + m))
    }
}

// Float-to-int `as` casts saturate and map NaN to 0.
fn to_channel(normalized: f64) -> u8 {
    (normalized * 255.0).clamp(0.0, 255.0) as u8
}

impl From<Rgb> for Hsl {
    fn from(rgb: Rgb) -> Self {
        let r = f64::from(rgb.r) / 255.0;
        let g = f64::from(rgb.g) / 255.0;
        let b = f64::from(rgb.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let lightness = (max + min) / 2.0;

        if delta == 0.0 {
            return Self::new(0.0, 0.0, lightness);
        }

        let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
        let hue = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        Self::new(hue, saturation, lightness)
    }
}

/// A grid position attached to a color when dimensions were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

/// A single synthesized color.
///
/// `value` is always `#` followed by six lowercase hex digits. `coordinate` is
/// present if and only if the generating config carried dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ColorResult {
    pub value: String,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "coordinates", skip_serializing_if = "Option::is_none")
    )]
    pub coordinate: Option<Coordinate>,
}

impl ColorResult {
    /// Parses `value` back into its channels.
    pub fn rgb(&self) -> Result<Rgb> {
        self.value.parse()
    }
}
