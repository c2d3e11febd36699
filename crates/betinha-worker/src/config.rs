//! Converter configuration.

use std::path::PathBuf;

/// Tool locations and download settings.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// FFmpeg executable
    pub ffmpeg_program: String,
    /// FFprobe executable
    pub ffprobe_program: String,
    /// yt-dlp script or executable
    pub ytdlp_program: String,
    /// Interpreter yt-dlp runs under, `None` to run it directly
    pub ytdlp_interpreter: Option<String>,
    /// Fixed path of the downloaded artifact, overwritten by every job
    pub download_path: PathBuf,
    /// Container forced on yt-dlp's merged output
    pub merge_format: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_program: "ffmpeg".to_string(),
            ffprobe_program: "ffprobe".to_string(),
            ytdlp_program: "./libs/yt-dlp".to_string(),
            ytdlp_interpreter: Some("python3".to_string()),
            download_path: std::env::temp_dir().join("ytdlp_input.mkv"),
            merge_format: "mkv".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ffmpeg_program: std::env::var("BETINHA_FFMPEG")
                .ok()
                .unwrap_or(defaults.ffmpeg_program),
            ffprobe_program: std::env::var("BETINHA_FFPROBE")
                .ok()
                .unwrap_or(defaults.ffprobe_program),
            ytdlp_program: std::env::var("BETINHA_YTDLP")
                .ok()
                .unwrap_or(defaults.ytdlp_program),
            // Set but empty means "no interpreter"
            ytdlp_interpreter: match std::env::var("BETINHA_YTDLP_INTERPRETER") {
                Ok(value) if value.trim().is_empty() => None,
                Ok(value) => Some(value),
                Err(_) => defaults.ytdlp_interpreter,
            },
            download_path: std::env::var("BETINHA_DOWNLOAD_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.download_path),
            merge_format: std::env::var("BETINHA_MERGE_FORMAT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.merge_format),
        }
    }
}
