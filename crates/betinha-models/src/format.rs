//! Output formats supported by the converter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target container/image format for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    #[default]
    Mp4,
    Mp3,
}

impl OutputFormat {
    /// All formats, in the order they are offered to users.
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Webp,
        OutputFormat::Gif,
        OutputFormat::Mp4,
        OutputFormat::Mp3,
    ];

    /// Canonical file extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => ".png",
            OutputFormat::Jpeg => ".jpg",
            OutputFormat::Webp => ".webp",
            OutputFormat::Gif => ".gif",
            OutputFormat::Mp4 => ".mp4",
            OutputFormat::Mp3 => ".mp3",
        }
    }

    /// Formats that hold a single frame.
    pub fn is_still_image(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Webp)
    }

    /// Whether the output carries no video stream.
    pub fn is_audio_only(&self) -> bool {
        matches!(self, OutputFormat::Mp3)
    }

    /// Display name ("MP4", "JPEG", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Webp => "WEBP",
            OutputFormat::Gif => "GIF",
            OutputFormat::Mp4 => "MP4",
            OutputFormat::Mp3 => "MP3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a format name is not one of [`OutputFormat::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('.');
        OutputFormat::ALL
            .iter()
            .copied()
            .find(|f| {
                f.as_str().eq_ignore_ascii_case(name)
                    || f.extension()[1..].eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_names() {
        assert_eq!("mp4".parse::<OutputFormat>(), Ok(OutputFormat::Mp4));
        assert_eq!("JPEG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!(".webp".parse::<OutputFormat>(), Ok(OutputFormat::Webp));
        assert!("avi".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_extensions_are_distinct() {
        let mut exts: Vec<_> = OutputFormat::ALL.iter().map(|f| f.extension()).collect();
        exts.sort();
        exts.dedup();
        assert_eq!(exts.len(), OutputFormat::ALL.len());
    }

    #[test]
    fn test_frame_kinds() {
        assert!(OutputFormat::Png.is_still_image());
        assert!(!OutputFormat::Gif.is_still_image());
        assert!(!OutputFormat::Mp4.is_still_image());
        assert!(OutputFormat::Mp3.is_audio_only());
        assert!(!OutputFormat::Mp4.is_audio_only());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&OutputFormat::Mp3).unwrap();
        assert_eq!(json, "\"mp3\"");
    }
}
