use std::io;
use std::path::Path;

use filetime::FileTime;

use crate::date::CaptureMoment;
use crate::error::RetimeError;

/// Sets the access and modification times of a file in one call.
pub trait TimestampSetter {
    fn set_times(&self, path: &Path, atime: FileTime, mtime: FileTime) -> io::Result<()>;
}

/// Real filesystem backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTimeSetter;

impl TimestampSetter for FileTimeSetter {
    fn set_times(&self, path: &Path, atime: FileTime, mtime: FileTime) -> io::Result<()> {
        filetime::set_file_times(path, atime, mtime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Both timestamps were set to the moment.
    Written(CaptureMoment),
    /// Dry run: the moment that would have been written.
    WouldWrite(CaptureMoment),
}

/// Convert a capture moment to a file timestamp, keeping sub-second precision.
pub fn file_time(moment: &CaptureMoment) -> FileTime {
    let utc = moment.to_utc();
    FileTime::from_unix_time(utc.timestamp(), utc.timestamp_subsec_nanos())
}

/// Set the access and modification time of `path` to `moment`.
/// With `dry_run` the setter is never called.
pub fn apply(
    setter: &dyn TimestampSetter,
    path: &Path,
    moment: CaptureMoment,
    dry_run: bool,
) -> Result<WriteOutcome, RetimeError> {
    let ft = file_time(&moment);
    if dry_run {
        return Ok(WriteOutcome::WouldWrite(moment));
    }
    setter
        .set_times(path, ft, ft)
        .map_err(RetimeError::TimestampWrite)?;
    Ok(WriteOutcome::Written(moment))
}
