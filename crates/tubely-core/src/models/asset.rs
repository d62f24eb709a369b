use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Class of asset an upload is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Image,
    Video,
}

impl AssetClass {
    /// Declared media types accepted for this class. Exact match only.
    pub fn allowed_media_types(self) -> &'static [&'static str] {
        match self {
            AssetClass::Image => &["image/jpeg", "image/png"],
            AssetClass::Video => &["video/mp4"],
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetClass::Image => write!(f, "image"),
            AssetClass::Video => write!(f, "video"),
        }
    }
}

/// Coarse orientation bucket derived from a display aspect ratio.
///
/// Only used to namespace object keys; never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify a `W:H` display aspect ratio. Exact match, no tolerance.
    pub fn from_aspect_ratio(ratio: &str) -> Self {
        match ratio {
            "16:9" => Orientation::Landscape,
            "9:16" => Orientation::Portrait,
            _ => Orientation::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_classification() {
        assert_eq!(Orientation::from_aspect_ratio("16:9"), Orientation::Landscape);
        assert_eq!(Orientation::from_aspect_ratio("9:16"), Orientation::Portrait);
        assert_eq!(Orientation::from_aspect_ratio("4:3"), Orientation::Other);
        assert_eq!(Orientation::from_aspect_ratio("1:1"), Orientation::Other);
    }

    #[test]
    fn test_orientation_has_no_tolerance() {
        // 1920x1088 is close to 16:9 but not equal
        assert_eq!(Orientation::from_aspect_ratio("30:17"), Orientation::Other);
        assert_eq!(Orientation::from_aspect_ratio("16:09"), Orientation::Other);
        assert_eq!(Orientation::from_aspect_ratio(" 16:9"), Orientation::Other);
    }

    #[test]
    fn test_orientation_display() {
        assert_eq!(Orientation::Landscape.to_string(), "landscape");
        assert_eq!(Orientation::Portrait.to_string(), "portrait");
        assert_eq!(Orientation::Other.to_string(), "other");
    }

    #[test]
    fn test_allowed_media_types() {
        assert_eq!(AssetClass::Video.allowed_media_types(), &["video/mp4"]);
        assert!(AssetClass::Image.allowed_media_types().contains(&"image/png"));
        assert!(!AssetClass::Image.allowed_media_types().contains(&"image/gif"));
    }
}
