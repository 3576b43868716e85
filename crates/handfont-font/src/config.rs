use serde::{Deserialize, Serialize};

/// Seconds from 1904-01-01 to 2024-01-01 (UTC).
pub const DEFAULT_TIMESTAMP: i64 = 3_786_912_000;

/// Every fixed field of the emitted font.
///
/// Assembled once up front and read-only during serialization. The default
/// timestamp is fixed so identical outlines give identical bytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family_name: String,
    pub style_name: String,
    /// Major.minor revision, written to `head` and the version string.
    pub version: (u16, u16),
    /// Four-character OS/2 vendor tag, space padded when shorter.
    pub vendor_id: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub x_height: i16,
    pub cap_height: i16,
    /// `head` created and modified time, seconds since 1904-01-01 UTC.
    pub timestamp: i64,
    pub notdef_advance: u16,
    pub notdef_lsb: i16,
    /// Defaults to a quarter em.
    pub space_advance: Option<u16>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family_name: "MyHandwriting".to_string(),
            style_name: "Regular".to_string(),
            version: (1, 0),
            vendor_id: "NONE".to_string(),
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 0,
            x_height: 500,
            cap_height: 700,
            timestamp: DEFAULT_TIMESTAMP,
            notdef_advance: 600,
            notdef_lsb: 100,
            space_advance: None,
        }
    }
}

impl FontConfig {
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family_name = family.into();
        self
    }

    pub fn space_advance(&self) -> u16 {
        self.space_advance.unwrap_or(self.units_per_em / 4)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.family_name, self.style_name)
    }

    /// `Family-Style` with characters PostScript forbids removed.
    pub fn postscript_name(&self) -> String {
        let clean = |s: &str| -> String {
            s.chars()
                .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
                .collect()
        };
        let mut name = format!("{}-{}", clean(&self.family_name), clean(&self.style_name));
        name.truncate(63);
        name
    }

    pub fn version_string(&self) -> String {
        format!("Version {}.{:03}", self.version.0, self.version.1)
    }

    /// Revision as the `head` fixed-point value.
    pub fn revision(&self) -> f64 {
        self.version.0 as f64 + self.version.1 as f64 / 1000.0
    }

    /// Stem for output files: `Family-Style` with spaces removed.
    pub fn file_stem(&self) -> String {
        self.postscript_name()
    }
}
