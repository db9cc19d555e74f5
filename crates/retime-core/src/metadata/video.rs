use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::MetadataMap;
use crate::error::RetimeError;

/// How often a running probe is polled when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One stream of a media container as reported by the probe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub codec_type: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<StreamDescriptor>,
}

/// Lists the streams of a media container.
pub trait StreamProber {
    fn probe(&self, path: &Path) -> Result<Vec<StreamDescriptor>, RetimeError>;
}

/// Runs `ffprobe` as a child process and decodes its JSON output.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RetimeError> {
        let io_err = |e: std::io::Error| RetimeError::MetadataRead(e.to_string());
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(io_err);
        };

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(io_err)? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RetimeError::MetadataRead(format!(
                    "{} timed out after {:.1}s",
                    self.program.display(),
                    timeout.as_secs_f64()
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl StreamProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<Vec<StreamDescriptor>, RetimeError> {
        let mut child = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                RetimeError::MetadataRead(format!("failed to run {}: {}", self.program.display(), e))
            })?;

        // Drain stdout on its own thread so a chatty probe cannot block on a
        // full pipe while we wait for it to exit.
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RetimeError::MetadataRead("probe stdout not captured".to_string()))?;
        let reader = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf)?;
            Ok(buf)
        });

        let status = self.wait(&mut child)?;
        let output = reader
            .join()
            .map_err(|_| RetimeError::MetadataRead("probe output reader panicked".to_string()))?
            .map_err(|e| RetimeError::MetadataRead(e.to_string()))?;

        if !status.success() {
            return Err(RetimeError::MetadataRead(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        parse_probe_output(&output)
    }
}

pub(crate) fn parse_probe_output(bytes: &[u8]) -> Result<Vec<StreamDescriptor>, RetimeError> {
    let output: ProbeOutput = serde_json::from_slice(bytes)
        .map_err(|e| RetimeError::MetadataRead(format!("invalid probe output: {}", e)))?;
    Ok(output.streams)
}

/// Tag mapping of the first video stream.
pub fn read_video_metadata(
    path: &Path,
    prober: &dyn StreamProber,
) -> Result<MetadataMap, RetimeError> {
    let streams = prober.probe(path)?;
    let video = streams
        .into_iter()
        .find(|s| s.codec_type == "video")
        .ok_or(RetimeError::NoVideoStreamFound)?;
    Ok(video.tags.into_iter().collect())
}
