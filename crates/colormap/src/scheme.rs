//! Color schemes, class palettes and the multi-stop interpolation engine.

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Continuous color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Black -> White
    Grayscale,
    /// Purple -> Teal -> Yellow
    Viridis,
    /// Brown -> Yellow -> Green
    Ndvi,
    /// Blue -> White -> Red (dNBR and other signed differences)
    Divergent,
}

impl ColorScheme {
    pub const ALL: &'static [ColorScheme] =
        &[Self::Grayscale, Self::Viridis, Self::Ndvi, Self::Divergent];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "Grayscale",
            Self::Viridis => "Viridis",
            Self::Ndvi => "NDVI",
            Self::Divergent => "Divergent",
        }
    }

    /// Look up a scheme by case-insensitive name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

// ─── Color stop definitions ────────────────────────────────────────────

const VIRIDIS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 68, 1, 84),
    ColorStop::new(0.25, 59, 82, 139),
    ColorStop::new(0.50, 33, 145, 140),
    ColorStop::new(0.75, 94, 201, 98),
    ColorStop::new(1.00, 253, 231, 37),
];

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const DIVERGENT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

// ─── Discrete palettes ─────────────────────────────────────────────────

/// A discrete palette for integer-coded rasters.
///
/// Value `first` maps to the first color, `first + 1` to the second and so
/// on. Values past the end reuse the last color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub name: &'static str,
    /// Code of the first color
    pub first: u8,
    pub colors: &'static [Rgb],
}

impl Palette {
    /// Scene Classification Layer, codes 0..=11.
    pub const SCL: Palette = Palette {
        name: "scl",
        first: 0,
        colors: &[
            Rgb::new(0, 0, 0),       // no data
            Rgb::new(255, 0, 0),     // saturated / defective
            Rgb::new(210, 105, 30),  // dark area
            Rgb::new(165, 42, 42),   // cloud shadow
            Rgb::new(0, 255, 0),     // vegetation
            Rgb::new(255, 255, 0),   // not vegetated
            Rgb::new(0, 0, 255),     // water
            Rgb::new(0, 255, 255),   // unclassified
            Rgb::new(169, 169, 169), // cloud, medium probability
            Rgb::new(211, 211, 211), // cloud, high probability
            Rgb::new(0, 191, 255),   // thin cirrus
            Rgb::new(255, 0, 255),   // snow / ice
        ],
    };

    /// NDVI classes from 1. Class 13 shares the last color.
    pub const NDVI_CLASSES: Palette = Palette {
        name: "ndvi",
        first: 1,
        colors: &[
            Rgb::new(0x00, 0x00, 0x00),
            Rgb::new(0xa5, 0x00, 0x26),
            Rgb::new(0xd7, 0x30, 0x27),
            Rgb::new(0xf4, 0x6d, 0x43),
            Rgb::new(0xfd, 0xae, 0x61),
            Rgb::new(0xfe, 0xe0, 0x8b),
            Rgb::new(0xff, 0xff, 0xbf),
            Rgb::new(0xd9, 0xef, 0x8b),
            Rgb::new(0xa6, 0xd9, 0x6a),
            Rgb::new(0x66, 0xbd, 0x63),
            Rgb::new(0x1a, 0x98, 0x50),
            Rgb::new(0x00, 0x68, 0x37),
        ],
    };

    /// VCI drought classes 1..=3.
    pub const VCI_CLASSES: Palette = Palette {
        name: "vci",
        first: 1,
        colors: &[
            Rgb::new(255, 0, 0),
            Rgb::new(255, 255, 0),
            Rgb::new(0, 128, 0),
        ],
    };

    /// dNBR severity classes from 1. Class 8 shares the last color.
    pub const DNBR_CLASSES: Palette = Palette {
        name: "dnbr",
        first: 1,
        colors: &[
            Rgb::new(0, 0, 255),
            Rgb::new(0, 128, 128),
            Rgb::new(0, 128, 0),
            Rgb::new(255, 255, 0),
            Rgb::new(255, 165, 0),
            Rgb::new(255, 0, 0),
            Rgb::new(128, 0, 128),
        ],
    };

    /// Palette matching a threshold table name (`ndvi`, `vci`, `dnbr`).
    pub fn for_index(name: &str) -> Option<Palette> {
        match name {
            "ndvi" => Some(Self::NDVI_CLASSES),
            "vci" => Some(Self::VCI_CLASSES),
            "dnbr" => Some(Self::DNBR_CLASSES),
            "scl" => Some(Self::SCL),
            _ => None,
        }
    }

    /// Color of `code`, clamped to the palette.
    pub fn color(&self, code: u8) -> Rgb {
        let last = self.colors.len().saturating_sub(1);
        let idx = (code.saturating_sub(self.first) as usize).min(last);
        self.colors[idx]
    }
}

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let last = stops[stops.len() - 1].color;
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return last;
    }
    stops
        .windows(2)
        .find(|w| t <= w[1].t)
        .map_or(last, |w| {
            let ratio = (t - w[0].t) / (w[1].t - w[0].t);
            lerp_color(w[0].color, w[1].color, ratio)
        })
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Positions outside the unit interval clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Viridis => multi_stop(VIRIDIS_STOPS, t),
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::Divergent => multi_stop(DIVERGENT_STOPS, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_midpoint() {
        assert_eq!(evaluate(ColorScheme::Grayscale, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn viridis_endpoints() {
        assert_eq!(evaluate(ColorScheme::Viridis, 0.0), Rgb::new(68, 1, 84));
        assert_eq!(evaluate(ColorScheme::Viridis, 1.0), Rgb::new(253, 231, 37));
    }

    #[test]
    fn divergent_center_is_white() {
        assert_eq!(evaluate(ColorScheme::Divergent, 0.5), Rgb::new(247, 247, 247));
    }

    #[test]
    fn clamping_outside_unit_interval() {
        assert_eq!(evaluate(ColorScheme::Ndvi, -0.5), Rgb::new(120, 70, 20));
        assert_eq!(evaluate(ColorScheme::Ndvi, 1.5), Rgb::new(10, 100, 20));
    }

    #[test]
    fn scheme_names() {
        assert_eq!(ColorScheme::from_name("ndvi"), Some(ColorScheme::Ndvi));
        assert_eq!(ColorScheme::from_name("VIRIDIS"), Some(ColorScheme::Viridis));
        assert_eq!(ColorScheme::from_name("terrain"), None);
    }

    #[test]
    fn ndvi_palette_matches_hex_table() {
        let hex: [u32; 12] = [
            0x000000, 0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b,
            0xa6d96a, 0x66bd63, 0x1a9850, 0x006837,
        ];
        for (i, h) in hex.iter().enumerate() {
            let [_, r, g, b] = h.to_be_bytes();
            assert_eq!(Palette::NDVI_CLASSES.colors[i], Rgb::new(r, g, b));
        }
    }

    #[test]
    fn palette_lookup_clamps() {
        let p = Palette::DNBR_CLASSES;
        assert_eq!(p.color(1), Rgb::new(0, 0, 255));
        assert_eq!(p.color(7), Rgb::new(128, 0, 128));
        // Extreme severity has no color of its own
        assert_eq!(p.color(8), p.color(7));

        assert_eq!(Palette::NDVI_CLASSES.color(13), Palette::NDVI_CLASSES.color(12));
        assert_eq!(Palette::SCL.color(0), Rgb::new(0, 0, 0));
        assert_eq!(Palette::SCL.color(11), Rgb::new(255, 0, 255));
    }

    #[test]
    fn palette_sizes() {
        assert_eq!(Palette::SCL.colors.len(), 12);
        assert_eq!(Palette::NDVI_CLASSES.colors.len(), 12);
        assert_eq!(Palette::VCI_CLASSES.colors.len(), 3);
        assert_eq!(Palette::DNBR_CLASSES.colors.len(), 7);
        assert_eq!(Palette::for_index("vci"), Some(Palette::VCI_CLASSES));
        assert_eq!(Palette::for_index("ndwi"), None);
    }
}
