//! Audio operations backed by the external tools and an HTTP client.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use reqwest::blocking::Client;

use crate::config::EncodingSettings;
use crate::models::CLIP_EXTENSION;
use crate::scratch::ScratchSpace;
use crate::tools::{ToolRunner, Toolset};

use super::error::{OpError, OpResult};
use super::AudioOps;

/// Extension used when a downloaded URL does not carry a usable one.
const FALLBACK_EXTENSION: &str = "bin";

/// [`AudioOps`] implementation that shells out to the located tools.
pub struct ToolOps {
    tools: Toolset,
    runner: ToolRunner,
    scratch: ScratchSpace,
    encoding: EncodingSettings,
    http: Client,
}

impl ToolOps {
    /// Create the operation layer for one run.
    pub fn new(
        tools: Toolset,
        runner: ToolRunner,
        scratch: ScratchSpace,
        encoding: EncodingSettings,
    ) -> OpResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("quizrip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpError::other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            tools,
            runner,
            scratch,
            encoding,
            http,
        })
    }

    /// Allocate an artifact and let `write` fill it, discarding it on failure.
    fn produce<F>(&self, extension: &str, write: F) -> OpResult<PathBuf>
    where
        F: FnOnce(&Path) -> OpResult<()>,
    {
        let artifact = self.scratch.file(extension);
        match write(&artifact) {
            Ok(()) => Ok(artifact),
            Err(e) => {
                self.scratch.discard(&artifact);
                Err(e)
            }
        }
    }

    /// Fetch `url` into `dest`.
    fn fetch(&self, url: &str, dest: &Path) -> OpResult<()> {
        tracing::debug!("GET {}", url);
        let mut response = self.http.get(url).send().map_err(|e| OpError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpError::status(url, status.as_u16()));
        }

        let mut file = File::create(dest).map_err(|e| OpError::io("download", e))?;
        let bytes = response
            .copy_to(&mut file)
            .map_err(|e| OpError::http(url, e))?;
        tracing::debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}

impl AudioOps for ToolOps {
    fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    fn download(&self, url: &str) -> OpResult<PathBuf> {
        let extension = url_extension(url).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        self.produce(&extension, |out| self.fetch(url, out))
    }

    fn acquire(&self, url: &str) -> OpResult<PathBuf> {
        // The downloader names its own output, so give it a private directory.
        let workdir = self.scratch.dir().map_err(|e| OpError::io("acquire", e))?;

        let mut cmd = Command::new(&self.tools.downloader);
        cmd.current_dir(&workdir)
            .arg("--extract-audio")
            .arg("--audio-format")
            .arg(CLIP_EXTENSION)
            .arg(url);

        let result = self.produce(CLIP_EXTENSION, |out| {
            self.runner
                .run(cmd)
                .map_err(|e| OpError::tool("acquire", e))?;
            let produced = find_output(&workdir, CLIP_EXTENSION)?;
            fs::rename(&produced, out).map_err(|e| OpError::io("acquire", e))
        });
        self.scratch.discard(&workdir);
        result
    }

    fn trim(&self, input: &Path, start: &str, length: &str) -> OpResult<PathBuf> {
        self.produce(CLIP_EXTENSION, |out| {
            let mut cmd = Command::new(&self.tools.transcoder);
            cmd.arg("-ss")
                .arg(start)
                .arg("-i")
                .arg(input)
                .arg("-t")
                .arg(length)
                .arg("-acodec")
                .arg("copy")
                .arg(out);
            self.runner.run(cmd).map_err(|e| OpError::tool("trim", e))
        })
    }

    fn transcode(&self, input: &Path) -> OpResult<PathBuf> {
        self.produce(CLIP_EXTENSION, |out| {
            let mut render = Command::new(&self.tools.synth);
            render.arg(input).arg("-Ow").arg("-o").arg("-");

            let mut encode = Command::new(&self.tools.transcoder);
            encode
                .arg("-i")
                .arg("-")
                .arg("-acodec")
                .arg(&self.encoding.codec)
                .arg("-ab")
                .arg(&self.encoding.bitrate)
                .arg(out);

            self.runner
                .run_piped(render, encode)
                .map_err(|e| OpError::tool("transcode", e))
        })
    }

    fn mix(&self, first: &Path, second: &Path, volume: &str) -> OpResult<PathBuf> {
        self.produce(CLIP_EXTENSION, |out| {
            let mut cmd = Command::new(&self.tools.mixer);
            cmd.arg("-m")
                .arg(first)
                .arg("-v")
                .arg(volume)
                .arg(second)
                .arg(out);
            self.runner.run(cmd).map_err(|e| OpError::tool("mix", e))
        })
    }

    fn change_speed(&self, input: &Path, factor: &str) -> OpResult<PathBuf> {
        self.produce(CLIP_EXTENSION, |out| {
            let mut cmd = Command::new(&self.tools.mixer);
            cmd.arg(input).arg(out).arg("speed").arg(factor);
            self.runner
                .run(cmd)
                .map_err(|e| OpError::tool("change speed", e))
        })
    }
}

/// Extension of the last path segment of `url`, if it looks like one.
fn url_extension(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let ext = Path::new(parsed.path()).extension()?.to_str()?;
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// First file in `dir` with the given extension.
fn find_output(dir: &Path, extension: &str) -> OpResult<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| OpError::io("acquire", e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| OpError::no_output("acquire", format!(".{}", extension)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_extension_from_path() {
        assert_eq!(url_extension("http://host/songs/theme.MID"), Some("mid".to_string()));
        assert_eq!(url_extension("http://host/a.mid?dl=1"), Some("mid".to_string()));
        assert_eq!(url_extension("http://host/watch"), None);
        assert_eq!(url_extension("http://host/weird.ext%20name"), None);
        assert_eq!(url_extension("not a url"), None);
    }

    #[test]
    fn find_output_requires_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("clip.webm.part"), b"x").unwrap();
        assert!(matches!(
            find_output(dir.path(), "mp3"),
            Err(OpError::NoOutput { .. })
        ));

        fs::write(dir.path().join("Clip.MP3"), b"x").unwrap();
        assert_eq!(
            find_output(dir.path(), "mp3").unwrap(),
            dir.path().join("Clip.MP3")
        );
    }
}
