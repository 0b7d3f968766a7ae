//! Colour parsing, palette schemes and palette export

use std::str::FromStr;

use serde::Serialize;

use super::ToolError;
use crate::imaging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Dominant,
    Complementary,
    Analogous,
    Triadic,
    Monochromatic,
}

impl FromStr for Scheme {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dominant" => Ok(Scheme::Dominant),
            "complementary" => Ok(Scheme::Complementary),
            "analogous" => Ok(Scheme::Analogous),
            "triadic" => Ok(Scheme::Triadic),
            "monochromatic" => Ok(Scheme::Monochromatic),
            other => Err(ToolError::unsupported("palette scheme", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Css,
    Sass,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(ExportFormat::Css),
            "sass" => Ok(ExportFormat::Sass),
            "json" => Ok(ExportFormat::Json),
            other => Err(ToolError::unsupported("export format", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteColor {
    pub hex: String,
    pub rgb: [u8; 3],
    /// Hue in degrees, saturation and lightness in percent
    pub hsl: [f64; 3],
}

impl PaletteColor {
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let [h, s, l] = rgb_to_hsl(rgb);
        Self {
            hex: format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]),
            rgb,
            hsl: [round1(h), round1(s), round1(l)],
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn rgb_to_hsl([r, g, b]: [u8; 3]) -> [f64; 3] {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d == 0.0 {
        return [0.0, 0.0, l * 100.0];
    }

    let s = d / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    [h, s * 100.0, l * 100.0]
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

fn invalid_color() -> ToolError {
    ToolError::invalid(
        "Invalid color input. Use hex, RGB, or HSL (e.g., #FF0000, rgb(255,0,0), hsl(0,100%,50%)).",
    )
}

fn function_args<'a>(input: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let rest = input.strip_prefix(name)?;
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split([',', ' ', '/'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `hsl(h, s%, l%)`
pub fn parse_color(input: &str) -> Result<[u8; 3], ToolError> {
    let input = input.trim().to_ascii_lowercase();

    if let Some(args) = function_args(&input, "rgb") {
        if args.len() < 3 {
            return Err(invalid_color());
        }
        let mut rgb = [0u8; 3];
        for (slot, arg) in rgb.iter_mut().zip(&args) {
            let v: f64 = arg.parse().map_err(|_| invalid_color())?;
            if !(0.0..=255.0).contains(&v) {
                return Err(invalid_color());
            }
            *slot = v.round() as u8;
        }
        return Ok(rgb);
    }

    if let Some(args) = function_args(&input, "hsl") {
        if args.len() < 3 {
            return Err(invalid_color());
        }
        let num = |s: &str| -> Result<f64, ToolError> {
            s.trim_end_matches("deg")
                .trim_end_matches('%')
                .parse()
                .map_err(|_| invalid_color())
        };
        return Ok(hsl_to_rgb(num(args[0])?, num(args[1])?, num(args[2])?));
    }

    let hex = input.strip_prefix('#').unwrap_or(&input);
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(invalid_color()),
    };
    let bytes = hex::decode(&expanded).map_err(|_| invalid_color())?;
    Ok([bytes[0], bytes[1], bytes[2]])
}

fn rotate(rgb: [u8; 3], degrees: f64) -> [u8; 3] {
    let [h, s, l] = rgb_to_hsl(rgb);
    hsl_to_rgb(h + degrees, s, l)
}

fn with_lightness(rgb: [u8; 3], delta: f64) -> [u8; 3] {
    let [h, s, l] = rgb_to_hsl(rgb);
    hsl_to_rgb(h, s, (l + delta).clamp(0.0, 100.0))
}

/// Palette derived from a single base colour
pub fn palette(base: &str, scheme: Scheme) -> Result<Vec<PaletteColor>, ToolError> {
    let base = parse_color(base)?;
    let colors = match scheme {
        Scheme::Dominant => vec![base],
        Scheme::Complementary => vec![base, rotate(base, 180.0)],
        Scheme::Analogous => vec![base, rotate(base, -30.0), rotate(base, 30.0)],
        Scheme::Triadic => vec![base, rotate(base, 120.0), rotate(base, 240.0)],
        Scheme::Monochromatic => vec![
            with_lightness(base, -30.0),
            with_lightness(base, -15.0),
            base,
            with_lightness(base, 15.0),
            with_lightness(base, 30.0),
        ],
    };
    Ok(colors.into_iter().map(PaletteColor::from_rgb).collect())
}

/// Dominant colours of an encoded image
pub fn extract(image: &[u8], count: usize) -> Result<Vec<PaletteColor>, imaging::ImagingError> {
    Ok(imaging::dominant_colors(image, count.clamp(1, 16))?
        .into_iter()
        .map(PaletteColor::from_rgb)
        .collect())
}

pub fn export(colors: &[PaletteColor], format: ExportFormat) -> Result<String, ToolError> {
    Ok(match format {
        ExportFormat::Css => {
            let vars: Vec<String> = colors
                .iter()
                .enumerate()
                .map(|(i, c)| format!("  --color-{}: {};", i + 1, c.hex))
                .collect();
            format!(":root {{\n{}\n}}", vars.join("\n"))
        }
        ExportFormat::Sass => colors
            .iter()
            .enumerate()
            .map(|(i, c)| format!("$color-{}: {};", i + 1, c.hex))
            .collect::<Vec<_>>()
            .join("\n"),
        ExportFormat::Json => serde_json::to_string_pretty(colors)
            .map_err(|e| ToolError::invalid(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_color("#FF0000").unwrap(), [255, 0, 0]);
        assert_eq!(parse_color("0f0").unwrap(), [0, 255, 0]);
        assert_eq!(parse_color("rgb(0, 0, 255)").unwrap(), [0, 0, 255]);
        assert_eq!(parse_color("hsl(0, 100%, 50%)").unwrap(), [255, 0, 0]);
        assert_eq!(parse_color("hsl(120 100% 25%)").unwrap(), [0, 128, 0]);
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("rgb(300,0,0)").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn test_hsl_of_base() {
        let red = PaletteColor::from_rgb([255, 0, 0]);
        assert_eq!(red.hex, "#FF0000");
        assert_eq!(red.hsl, [0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_schemes() {
        let comp = palette("#FF0000", Scheme::Complementary).unwrap();
        assert_eq!(comp[1].hex, "#00FFFF");

        let tri = palette("#FF0000", Scheme::Triadic).unwrap();
        let hexes: Vec<&str> = tri.iter().map(|c| c.hex.as_str()).collect();
        assert_eq!(hexes, vec!["#FF0000", "#00FF00", "#0000FF"]);

        let ana = palette("#FF0000", Scheme::Analogous).unwrap();
        assert_eq!(ana[1].hex, "#FF0080");
        assert_eq!(ana[2].hex, "#FF8000");

        let mono = palette("#FF0000", Scheme::Monochromatic).unwrap();
        assert_eq!(mono.len(), 5);
        assert_eq!(mono[2].hex, "#FF0000");
        assert!(mono.iter().all(|c| c.hsl[0] == 0.0));
    }

    #[test]
    fn test_export() {
        let colors = palette("#FF0000", Scheme::Complementary).unwrap();
        assert_eq!(
            export(&colors, ExportFormat::Css).unwrap(),
            ":root {\n  --color-1: #FF0000;\n  --color-2: #00FFFF;\n}"
        );
        assert_eq!(
            export(&colors, ExportFormat::Sass).unwrap(),
            "$color-1: #FF0000;\n$color-2: #00FFFF;"
        );
        let json: serde_json::Value =
            serde_json::from_str(&export(&colors, ExportFormat::Json).unwrap()).unwrap();
        assert_eq!(json[1]["rgb"], serde_json::json!([0, 255, 255]));
    }

    #[test]
    fn test_extract_from_solid_image() {
        let png = crate::imaging::compress::tests::sample_png(8, 8);
        let colors = extract(&png, 3).unwrap();
        assert!(!colors.is_empty());
    }
}
