//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a default so a partial (or missing) file is valid.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Scratch and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool programs.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Encoding parameters for extracted and rendered audio.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Overlap merge behavior.
    #[serde(default)]
    pub overlap: OverlapSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Failure policy for a run.
    #[serde(default)]
    pub run: RunSettings,
}

/// Path configuration for scratch space and logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Parent folder for the run's scratch directory.
    ///
    /// Empty means "inside the output folder", which keeps final placement
    /// a same-filesystem rename.
    #[serde(default)]
    pub temp_root: String,

    /// Folder for run log files. Empty disables the log file.
    #[serde(default)]
    pub logs_folder: String,
}

/// External programs, as names looked up on `PATH` or explicit paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Media extraction tool (video platforms).
    #[serde(default = "default_downloader")]
    pub downloader: String,

    /// MIDI synthesizer writing WAV to stdout.
    #[serde(default = "default_synth")]
    pub synth: String,

    /// Transcoder used for trimming and encoding.
    #[serde(default = "default_transcoder")]
    pub transcoder: String,

    /// Audio manipulation tool used for mixing and speed changes.
    #[serde(default = "default_mixer")]
    pub mixer: String,

    /// Kill a tool after this many seconds. `0` waits forever.
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_downloader() -> String {
    "youtube-dl".to_string()
}

fn default_synth() -> String {
    "timidity".to_string()
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

fn default_mixer() -> String {
    "sox".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            synth: default_synth(),
            transcoder: default_transcoder(),
            mixer: default_mixer(),
            timeout_secs: 0,
        }
    }
}

/// Encoding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Encoder used when rendering MIDI.
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Bitrate used when rendering MIDI.
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
}

fn default_codec() -> String {
    "libmp3lame".to_string()
}

fn default_bitrate() -> String {
    "64k".to_string()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            codec: default_codec(),
            bitrate: default_bitrate(),
        }
    }
}

/// Overlap merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapSettings {
    /// Volume adjustment passed to the mixer.
    #[serde(default = "default_volume")]
    pub volume: String,

    /// Keep resolving other indices when one overlap group fails.
    ///
    /// Off by default: the first bad group stops the whole phase.
    #[serde(default)]
    pub isolate_failures: bool,
}

fn default_volume() -> String {
    "1.0".to_string()
}

impl Default for OverlapSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            isolate_failures: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Keep tool stderr in the tail buffer instead of echoing it.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool stderr lines shown after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with the time.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
        }
    }
}

/// Run-level failure policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSettings {
    /// Remove clips already placed for an entry that later failed.
    ///
    /// Off by default, so a failed entry may leave a question without an
    /// answer (or the reverse).
    #[serde(default)]
    pub discard_partial_outputs: bool,

    /// Leave the scratch directory behind for inspection.
    #[serde(default)]
    pub keep_scratch: bool,
}

/// Names of config sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Tools,
    Encoding,
    Overlap,
    Logging,
    Run,
}

impl ConfigSection {
    /// All sections, in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[
            Self::Paths,
            Self::Tools,
            Self::Encoding,
            Self::Overlap,
            Self::Logging,
            Self::Run,
        ]
    }

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Overlap => "overlap",
            ConfigSection::Logging => "logging",
            ConfigSection::Run => "run",
        }
    }

    /// Comment written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Scratch and log locations",
            ConfigSection::Tools => "External programs (names on PATH or full paths)",
            ConfigSection::Encoding => "Audio encoding parameters",
            ConfigSection::Overlap => "Overlap question merging",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Run => "Failure policy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[tools]"));
        assert!(toml.contains("[overlap]"));
        assert!(toml.contains("downloader"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[tools]\nmixer = \"/opt/sox/bin/sox\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.tools.mixer, "/opt/sox/bin/sox");
        // Defaults applied for missing
        assert_eq!(parsed.tools.transcoder, "ffmpeg");
        assert_eq!(parsed.overlap.volume, "1.0");
        assert!(!parsed.overlap.isolate_failures);
        assert_eq!(parsed.encoding.bitrate, "64k");
    }

    #[test]
    fn encoding_has_no_format_switch() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(!toml.contains("audio_format"));

        // Older files that still carry the key load fine.
        let legacy = "[encoding]\naudio_format = \"m4a\"\nbitrate = \"96k\"";
        let parsed: Settings = toml::from_str(legacy).unwrap();
        assert_eq!(parsed.encoding.bitrate, "96k");
    }

    #[test]
    fn every_section_has_a_table_name() {
        let names: Vec<_> = ConfigSection::all().iter().map(|s| s.table_name()).collect();
        assert_eq!(names, ["paths", "tools", "encoding", "overlap", "logging", "run"]);
    }
}
