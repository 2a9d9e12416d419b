//! Color space conversion helpers.
//!
//! Pure functions over 8-bit RGB samples. [`ColorSensor`](crate::ColorSensor)
//! takes a fresh sample and hands it to these, so they can also be used on
//! readings stored by the application.
//!
//! A white-balance channel value of 0 means "unset" and leaves that channel
//! uncorrected.

use crate::types::Filter;
use palette::num::Sqrt;
use palette::{Hsv, Srgb, Xyz};

/// Reference white point (D65) used by [`chroma`].
pub const WHITE_POINT: (f32, f32, f32) = (0.95047, 1.0, 1.08883);

/// A color in the subtractive CMYK space, every channel in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cmyk {
    pub cyan: f32,
    pub magenta: f32,
    pub yellow: f32,
    pub black: f32,
}

impl Cmyk {
    /// Returns true for pure black, where cyan, magenta and yellow are
    /// undefined (the renormalization divides by zero and yields NaN).
    pub fn is_degenerate(&self) -> bool {
        self.black >= 1.0
    }
}

/// Conversion errors for inputs a color space cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorError {
    /// Pure black has no defined CMY components.
    DegenerateBlack,
}

impl core::fmt::Display for ColorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ColorError::DegenerateBlack => {
                write!(f, "pure black has no defined cyan, magenta or yellow component")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ColorError {}

/// Multiplicative white-balance factor for one channel.
#[inline]
fn balance_factor(white: u8) -> f32 {
    if white > 0 { white as f32 / 255.0 } else { 1.0 }
}

#[inline]
fn normalized(color: Srgb<u8>) -> (f32, f32, f32) {
    (
        color.red as f32 / 255.0,
        color.green as f32 / 255.0,
        color.blue as f32 / 255.0,
    )
}

/// Converts a sample to HSV after white-balance correction.
///
/// Hue is in degrees 0.0-360.0 (exclusive), saturation and value in 0.0-1.0.
/// Achromatic input yields hue 0 and saturation 0.
pub fn to_hsv(color: Srgb<u8>, white_balance: Srgb<u8>) -> Hsv {
    let (r, g, b) = normalized(color);
    let r = r * balance_factor(white_balance.red);
    let g = g * balance_factor(white_balance.green);
    let b = b * balance_factor(white_balance.blue);

    let max_val = r.max(g.max(b));
    let min_val = r.min(g.min(b));
    let delta = max_val - min_val;
    let saturation = if max_val > 0.0 { delta / max_val } else { 0.0 };

    let hue = if delta > 0.0 {
        let sector = if max_val == r {
            (g - b) / delta
        } else if max_val == g {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        let mut hue = sector * 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        // Rounding can land a tiny negative hue exactly on 360.
        if hue >= 360.0 {
            hue -= 360.0;
        }
        hue
    } else {
        0.0
    };

    Hsv::new(hue, saturation, max_val)
}

/// Converts a sample to CMYK.
///
/// Pure black is passed through unguarded: black is 1.0 and the other
/// channels are NaN. Check [`Cmyk::is_degenerate`] or use [`try_to_cmyk`].
pub fn to_cmyk(color: Srgb<u8>) -> Cmyk {
    let (r, g, b) = normalized(color);

    let c = 1.0 - r;
    let m = 1.0 - g;
    let y = 1.0 - b;
    let k = c.min(m.min(y));

    Cmyk {
        cyan: (c - k) / (1.0 - k),
        magenta: (m - k) / (1.0 - k),
        yellow: (y - k) / (1.0 - k),
        black: k,
    }
}

/// Converts a sample to CMYK, reporting pure black as an error.
pub fn try_to_cmyk(color: Srgb<u8>) -> Result<Cmyk, ColorError> {
    let cmyk = to_cmyk(color);
    if cmyk.is_degenerate() {
        return Err(ColorError::DegenerateBlack);
    }
    Ok(cmyk)
}

/// Converts a sample to CIE 1931 XYZ after white-balance correction.
///
/// The sample is treated as linear; no gamma expansion is applied.
pub fn to_cie1931(color: Srgb<u8>, white_balance: Srgb<u8>) -> Xyz {
    // Corrected channels are truncated back to 8 bits before normalizing.
    let corrected = Srgb::new(
        (color.red as f32 * balance_factor(white_balance.red)) as u8,
        (color.green as f32 * balance_factor(white_balance.green)) as u8,
        (color.blue as f32 * balance_factor(white_balance.blue)) as u8,
    );
    let (r, g, b) = normalized(corrected);

    Xyz::new(
        0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
        0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
        0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
    )
}

/// Euclidean distance of an XYZ color from [`WHITE_POINT`].
pub fn chroma(xyz: Xyz) -> f32 {
    let dx = xyz.x - WHITE_POINT.0;
    let dy = xyz.y - WHITE_POINT.1;
    let dz = xyz.z - WHITE_POINT.2;

    Sqrt::sqrt(dx * dx + dy * dy + dz * dz)
}

/// Returns the strongest RGB channel.
///
/// Ties resolve to red, then green.
pub fn dominant_channel(color: Srgb<u8>) -> Filter {
    let max = color.red.max(color.green.max(color.blue));
    if max == color.red {
        Filter::Red
    } else if max == color.green {
        Filter::Green
    } else {
        Filter::Blue
    }
}

/// Sum of absolute per-channel differences.
#[inline]
pub fn manhattan_distance(a: Srgb<u8>, b: Srgb<u8>) -> u16 {
    a.red.abs_diff(b.red) as u16 + a.green.abs_diff(b.green) as u16 + a.blue.abs_diff(b.blue) as u16
}

/// Returns the label whose reference color is closest to `sample`.
///
/// `labels` and `references` are parallel; extra entries in the longer slice
/// are ignored. Ties resolve to the lowest index. Returns `None` when there is
/// nothing to compare against.
pub fn nearest_color<'l, L>(
    sample: Srgb<u8>,
    labels: &'l [L],
    references: &[Srgb<u8>],
) -> Option<&'l L> {
    let mut nearest = None;
    let mut min_dist = u16::MAX;

    for (label, reference) in labels.iter().zip(references) {
        let dist = manhattan_distance(sample, *reference);
        if dist < min_dist {
            min_dist = dist;
            nearest = Some(label);
        }
    }

    nearest
}
