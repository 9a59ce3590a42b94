//! Shared formatting and color helpers
//!
//! Number formatting, label splitting, and the sequential color scale used
//! by the treemap scene. Kept free of any UI types so the scene builder and
//! the tests can use them directly.

use serde::{Deserialize, Serialize};

/// Minus sign used by the value formatter (U+2212, not ASCII hyphen)
const MINUS: char = '\u{2212}';

/// Format a value as a rounded integer with thousands separators (`",d"`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "Infinity".to_string()
        } else {
            format!("{MINUS}Infinity")
        };
    }

    // Half-way cases round toward +inf
    let rounded = (value + 0.5).floor();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push(MINUS);
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Split a camel-case name into label lines.
///
/// A split happens before every uppercase ASCII letter that is followed by a
/// non-uppercase character, except at the very start of the string.
/// `"AgglomerativeCluster"` → `["Agglomerative", "Cluster"]`,
/// `"HTTPServer"` → `["HTTP", "Server"]`.
pub fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let boundary = i > 0
            && ch.is_ascii_uppercase()
            && chars.get(i + 1).is_some_and(|next| !next.is_ascii_uppercase());
        if boundary {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    parts.push(current);
    parts
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Darken by `0.7^k` per channel
    pub fn darker(self, k: f32) -> Self {
        let f = 0.7_f32.powf(k);
        let scale = |c: u8| (c as f32 * f).round().clamp(0.0, 255.0) as u8;
        Rgb(scale(self.0), scale(self.1), scale(self.2))
    }

    fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Magma palette control points, evenly spaced over 0..=1.
///
/// Nine stops stand in for the full 256-entry ramp; interpolated colors
/// stay within a few units per channel of it, but are not exact.
const MAGMA: [Rgb; 9] = [
    Rgb(0x00, 0x00, 0x04),
    Rgb(0x1c, 0x10, 0x44),
    Rgb(0x4f, 0x12, 0x7b),
    Rgb(0x81, 0x25, 0x81),
    Rgb(0xb5, 0x36, 0x7a),
    Rgb(0xe5, 0x50, 0x64),
    Rgb(0xfb, 0x87, 0x61),
    Rgb(0xfe, 0xc2, 0x87),
    Rgb(0xfc, 0xfd, 0xbf),
];

/// Sample the magma palette; `t` is clamped to 0..=1.
pub fn interpolate_magma(t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (MAGMA.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(MAGMA.len() - 2);
    MAGMA[i].lerp(MAGMA[i + 1], scaled - i as f32)
}

/// Sequential color scale mapping a numeric domain onto the magma palette.
#[derive(Debug, Clone, Copy)]
pub struct SequentialScale {
    pub domain: [f32; 2],
}

impl SequentialScale {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            domain: [start, end],
        }
    }

    pub fn color(&self, v: f32) -> Rgb {
        let [d0, d1] = self.domain;
        if d0 == d1 {
            return interpolate_magma(0.5);
        }
        interpolate_magma((v - d0) / (d1 - d0))
    }
}

impl Default for SequentialScale {
    /// Domain `[8, 0]`: height 8 maps to the dark end, leaves to the light end
    fn default() -> Self {
        Self::new(8.0, 0.0)
    }
}
