//! Rendering of country counts as an image.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::{Error, Result};

/// Dataset country names that differ from the geographic naming used by
/// renderers. Frozen lookup data.
const COUNTRY_SYNONYMS: &[(&str, &str)] = &[
    ("USA", "United States of America"),
    ("United States", "United States of America"),
    ("the Netherlands", "Netherlands"),
    ("Czech Republic", "Czechia"),
    ("Czechoslovakia", "Czechia"),
    ("Northern Ireland", "United Kingdom"),
    ("Scotland", "United Kingdom"),
    ("Russian Empire", "Russia"),
    ("USSR", "Russia"),
    ("Prussia", "Germany"),
    ("West Germany", "Germany"),
    ("East Germany", "Germany"),
    ("Austria-Hungary", "Austria"),
    ("Gold Coast", "Ghana"),
    ("Burma", "Myanmar"),
    ("Persia", "Iran"),
    ("Ottoman Empire", "Turkey"),
    ("Belgian Congo", "Democratic Republic of the Congo"),
    ("East Timor", "Timor-Leste"),
    ("Faroe Islands (Denmark)", "Denmark"),
    ("Guadeloupe Island", "France"),
    ("Tibet", "China"),
    ("British India", "India"),
    ("British Mandate of Palestine", "Israel"),
];

/// Geographic name for a dataset country. Names written as
/// `Former (Current)` resolve to the parenthesised current name.
pub fn geographic_name(country: &str) -> &str {
    let country = country.trim();
    if let Some((_, name)) = COUNTRY_SYNONYMS.iter().find(|(alias, _)| *alias == country) {
        return *name;
    }

    let current = country
        .rsplit_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match current {
        Some(current) => COUNTRY_SYNONYMS
            .iter()
            .find(|(alias, _)| *alias == current)
            .map_or(current, |(_, name)| *name),
        None => country,
    }
}

/// Merge counts under their geographic names.
pub fn merge_geographic(counts: &BTreeMap<String, usize>) -> BTreeMap<String, usize> {
    let mut merged = BTreeMap::new();
    for (country, count) in counts {
        *merged.entry(geographic_name(country).to_string()).or_insert(0) += count;
    }
    merged
}

pub trait Renderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self, counts: &BTreeMap<String, usize>, description: &str) -> Result<Vec<u8>>;
}

/// Horizontal bar chart as SVG, largest count first.
pub struct SvgChartRenderer {
    pub max_bars: usize,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self { max_bars: 25 }
    }
}

const BAR_HEIGHT: usize = 20;
const LABEL_WIDTH: usize = 260;
const CHART_WIDTH: usize = 480;
const HEADER: usize = 40;

impl Renderer for SvgChartRenderer {
    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, counts: &BTreeMap<String, usize>, description: &str) -> Result<Vec<u8>> {
        let mut bars: Vec<(String, usize)> = merge_geographic(counts).into_iter().collect();
        bars.sort_by(|a, b| b.1.cmp(&a.1));
        bars.truncate(self.max_bars);

        let max = bars.first().map_or(0, |(_, count)| *count).max(1);
        let height = HEADER + bars.len().max(1) * BAR_HEIGHT + 10;
        let width = LABEL_WIDTH + CHART_WIDTH + 60;

        let mut svg = String::new();
        write_svg(&mut svg, width, height, description, &bars, max)
            .map_err(|e| Error::Internal(format!("failed to render chart: {}", e)))?;
        Ok(svg.into_bytes())
    }
}

fn write_svg(
    out: &mut String,
    width: usize,
    height: usize,
    description: &str,
    bars: &[(String, usize)],
    max: usize,
) -> std::fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" font-family="sans-serif" font-size="12">"#
    )?;
    writeln!(
        out,
        r#"<text x="10" y="24" font-size="16">Laureates by country: {}</text>"#,
        escape(description)
    )?;

    if bars.is_empty() {
        writeln!(out, r#"<text x="10" y="{}">No matching laureates</text>"#, HEADER + 14)?;
    }

    for (row, (country, count)) in bars.iter().enumerate() {
        let y = HEADER + row * BAR_HEIGHT;
        let bar = (count * CHART_WIDTH / max).max(1);
        writeln!(
            out,
            r#"<text x="{}" y="{}" text-anchor="end">{}</text>"#,
            LABEL_WIDTH - 6,
            y + 14,
            escape(country)
        )?;
        writeln!(
            out,
            r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#4c72b0"/>"##,
            LABEL_WIDTH,
            y + 2,
            bar,
            BAR_HEIGHT - 4
        )?;
        writeln!(
            out,
            r#"<text x="{}" y="{}">{}</text>"#,
            LABEL_WIDTH + bar + 4,
            y + 14,
            count
        )?;
    }

    writeln!(out, "</svg>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_names() {
        assert_eq!(geographic_name("USA"), "United States of America");
        assert_eq!(geographic_name("Prussia (Germany)"), "Germany");
        assert_eq!(geographic_name("Russian Empire (Poland)"), "Poland");
        assert_eq!(geographic_name("Denmark"), "Denmark");
        assert_eq!(geographic_name("Unknown"), "Unknown");
    }

    #[test]
    fn test_merge_geographic() {
        let counts = BTreeMap::from([
            ("USA".to_string(), 3),
            ("United States".to_string(), 1),
            ("Prussia (Germany)".to_string(), 2),
            ("Germany".to_string(), 1),
        ]);
        let merged = merge_geographic(&counts);
        assert_eq!(merged.get("United States of America"), Some(&4));
        assert_eq!(merged.get("Germany"), Some(&3));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_svg_render() {
        let counts = BTreeMap::from([
            ("USA".to_string(), 4),
            ("Bosnia & Herzegovina".to_string(), 1),
        ]);
        let svg = SvgChartRenderer::default().render(&counts, "Physics, 1970-1980").unwrap();
        let svg = String::from_utf8(svg).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("United States of America"));
        assert!(svg.contains("Bosnia &amp; Herzegovina"));
        assert!(svg.find("United States").unwrap() < svg.find("Bosnia").unwrap());
    }

    #[test]
    fn test_empty_render() {
        let svg = SvgChartRenderer::default().render(&BTreeMap::new(), "Peace, 2030").unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("No matching laureates"));
    }
}
