use crate::{
    error::CollectError,
    snapshot::SnapshotRecord,
};
use std::{
    fs::{
        self,
        File,
        OpenOptions,
    },
    io::{
        self,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    sync::Mutex,
};

/// The append-only CSV log. No header; one row per successful collection.
#[derive(Debug)]
pub struct StatsLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl StatsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row. Either the whole row lands in the file or, on failure, the file is cut back to its
    /// previous length.
    pub fn append(&self, record: &SnapshotRecord) -> Result<(), CollectError> {
        let row = encode_row(record)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| self.persist_error(source))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.persist_error(source))?;
        self.write_row(&mut file, &row)?;

        debug!(path = ?self.path, bytes = row.len(), "appended snapshot row");
        Ok(())
    }

    fn write_row(&self, target: &mut impl AppendTarget, row: &[u8]) -> Result<(), CollectError> {
        let previous_len = target.current_len().map_err(|source| self.persist_error(source))?;

        if let Err(source) = target.write_all(row).and_then(|()| target.sync()) {
            if let Err(err) = target.truncate_to(previous_len) {
                error!(path = ?self.path, %err, "failed to roll back partially written row");
            }
            return Err(self.persist_error(source));
        }
        Ok(())
    }

    fn persist_error(&self, source: io::Error) -> CollectError {
        CollectError::Persist {
            path: self.path.clone(),
            source,
        }
    }
}

/// Where a row lands. `truncate_to` undoes a partial append.
trait AppendTarget: Write {
    fn current_len(&self) -> io::Result<u64>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

fn encode_row(record: &SnapshotRecord) -> Result<Vec<u8>, CollectError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record.columns())?;
    writer
        .into_inner()
        .map_err(|err| CollectError::Encode(csv::Error::from(err.into_error())))
}
