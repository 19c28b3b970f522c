use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Expected a #rrggbb color, got {0:?}")]
    InvalidHex(String),
}

/// Opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Page background in light mode
pub const LIGHT_BACKGROUND: Rgb = Rgb::new(255, 255, 255);
/// Page background in dark mode (`#0e0e11`)
pub const DARK_BACKGROUND: Rgb = Rgb::new(14, 14, 17);

pub fn background(dark_mode: bool) -> Rgb {
    if dark_mode {
        DARK_BACKGROUND
    } else {
        LIGHT_BACKGROUND
    }
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (either case)
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Composite this color at `alpha` over `background`
    pub fn over(self, background: Rgb, alpha: f64) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let blend = |f: u8, b: u8| (f as f64 * alpha + b as f64 * (1.0 - alpha)).round() as u8;
        Rgb::new(
            blend(self.r, background.r),
            blend(self.g, background.g),
            blend(self.b, background.b),
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Opaque CSS color for `hex` drawn at `alpha` over the page background
pub fn blend_with_background(hex: &str, alpha: f64, dark_mode: bool) -> Result<String, ColorError> {
    Ok(Rgb::from_hex(hex)?.over(background(dark_mode), alpha).to_string())
}

/// Composite several translucent colors onto the page background
///
/// Entries are composited in `(color, opacity)` order so the result does not
/// depend on the order the caller collected them in.
pub fn blend_colors(entries: &[(Rgb, f64)], dark_mode: bool) -> Rgb {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|(a, a_opacity), (b, b_opacity)| {
        a.to_hex()
            .cmp(&b.to_hex())
            .then(a_opacity.total_cmp(b_opacity))
    });
    sorted
        .into_iter()
        .fold(background(dark_mode), |acc, (color, opacity)| {
            color.over(acc, opacity)
        })
}
