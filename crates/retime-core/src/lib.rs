pub mod date;
pub mod error;
pub mod media;
pub mod metadata;
pub mod walk;
pub mod writer;

#[cfg(test)]
mod test_support;

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info, log_enabled, warn, Level};

pub use date::{CaptureMoment, CaptureZone};
pub use error::RetimeError;
pub use media::MediaKind;
pub use metadata::{FfprobeProber, MetadataMap, StreamDescriptor, StreamProber, TagKey};
pub use writer::{FileTimeSetter, TimestampSetter, WriteOutcome};

/// Default limit for a single probe run
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// File or directory to process
    pub root: PathBuf,
    /// Report what would be written without touching any file
    pub dry_run: bool,
    /// Log skipped hidden entries and extracted metadata
    pub debug: bool,
    /// Program used to probe video containers
    pub ffprobe: PathBuf,
    /// Kill a probe that runs longer than this
    pub probe_timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            debug: false,
            ffprobe: PathBuf::from("ffprobe"),
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_seen: u64,
    pub files_updated: u64,
    /// Dry run only: files that would have been updated
    pub files_would_update: u64,
    pub files_failed: u64,
}

impl RunSummary {
    fn record(&mut self, task: &FileTask) {
        self.files_seen += 1;
        match task.stage {
            FileStage::Written => self.files_updated += 1,
            FileStage::Skipped => self.files_would_update += 1,
            FileStage::Failed => self.files_failed += 1,
            _ => {}
        }
    }
}

/// Progress of one file through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Start,
    Classified,
    MetadataExtracted,
    DateResolved,
    Written,
    /// Dry run: the date was resolved but nothing was written.
    Skipped,
    Failed,
}

/// One file's pass through classify → extract → resolve → write.
#[derive(Debug)]
pub struct FileTask {
    pub path: PathBuf,
    pub stage: FileStage,
    pub kind: Option<MediaKind>,
    pub moment: Option<CaptureMoment>,
    pub outcome: Option<WriteOutcome>,
    /// Stage the task was in when it failed, and why
    pub failure: Option<(FileStage, RetimeError)>,
}

impl FileTask {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            stage: FileStage::Start,
            kind: None,
            moment: None,
            outcome: None,
            failure: None,
        }
    }

    /// Run the whole pipeline for `path`. Failures end up in the task,
    /// never in the caller.
    pub fn run(
        path: PathBuf,
        options: &RunOptions,
        prober: &dyn StreamProber,
        setter: &dyn TimestampSetter,
    ) -> Self {
        let mut task = FileTask::new(path);
        if let Err(e) = task.advance(options, prober, setter) {
            task.failure = Some((task.stage, e));
            task.stage = FileStage::Failed;
        }
        task
    }

    fn advance(
        &mut self,
        options: &RunOptions,
        prober: &dyn StreamProber,
        setter: &dyn TimestampSetter,
    ) -> Result<(), RetimeError> {
        let kind = media::classify(&self.path)?;
        self.kind = Some(kind);
        self.stage = FileStage::Classified;

        let metadata = metadata::extract(kind, &self.path, prober)?;
        self.stage = FileStage::MetadataExtracted;
        if options.debug && log_enabled!(Level::Debug) {
            debug!("Metadata for {}: {}", self.path.display(), format_metadata(&metadata));
        }

        let moment = date::resolve(kind, &metadata)?;
        self.moment = Some(moment);
        self.stage = FileStage::DateResolved;

        // Invariant: writing is only reachable with a resolved moment
        let outcome = writer::apply(setter, &self.path, moment, options.dry_run)?;
        self.stage = match outcome {
            WriteOutcome::Written(_) => FileStage::Written,
            WriteOutcome::WouldWrite(_) => FileStage::Skipped,
        };
        self.outcome = Some(outcome);
        Ok(())
    }
}

fn format_metadata(metadata: &MetadataMap) -> String {
    let entries: Vec<String> = metadata.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", entries.join(", "))
}

fn report(task: &FileTask) {
    let path = task.path.display();
    match (&task.failure, task.outcome) {
        (Some((_, err @ RetimeError::UnsupportedFileType { .. })), _) => {
            warn!("Skipping {}: {}", path, err);
        }
        (Some((stage, err)), _) => {
            error!("{} for {} (after {:?}): {}", err.kind(), path, stage, err);
        }
        (None, Some(WriteOutcome::Written(moment))) => {
            info!("Set {} to {}", path, moment);
        }
        (None, Some(WriteOutcome::WouldWrite(moment))) => {
            info!("Would set {} to {}", path, moment);
        }
        (None, None) => {}
    }
}

/// Process every file under `options.root` with ffprobe and the real
/// filesystem.
pub fn process(options: &RunOptions) -> anyhow::Result<RunSummary> {
    let prober = FfprobeProber::new(&options.ffprobe, options.probe_timeout);
    process_with(options, &prober, &FileTimeSetter)
}

/// Process every file under `options.root`, one at a time.
///
/// Per-file failures are logged and counted; only a failing walk (missing
/// root, unreadable directory) ends the run with an error.
pub fn process_with(
    options: &RunOptions,
    prober: &dyn StreamProber,
    setter: &dyn TimestampSetter,
) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();
    for path in walk::walk(&options.root, options) {
        let task = process_file(&path?, options, prober, setter);
        summary.record(&task);
    }
    Ok(summary)
}

/// Run and report the pipeline for one file.
pub fn process_file(
    path: &Path,
    options: &RunOptions,
    prober: &dyn StreamProber,
    setter: &dyn TimestampSetter,
) -> FileTask {
    let task = FileTask::run(path.to_path_buf(), options, prober, setter);
    report(&task);
    task
}
