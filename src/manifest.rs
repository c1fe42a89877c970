//! Batch manifests: one Turtle input path per line.
//!
//! Lines are read lazily, one at a time, as the batch loop asks for them. A
//! line that is not UTF-8 yields an error for that line only; a read error
//! ends the manifest.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::batch::VisualizationJob;
use crate::error::{BatchError, BatchResult};

/// One non-blank manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based line number in the manifest file.
    pub line_number: usize,
    /// The line with surrounding whitespace removed.
    pub path: PathBuf,
}

impl ManifestEntry {
    /// Pair this entry with the database and output directory fixed for the run.
    pub fn job(&self, database: &Path, output_dir: &Path) -> VisualizationJob {
        VisualizationJob {
            input: self.path.clone(),
            database: database.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        }
    }
}

/// Lazy iterator over the entries of a manifest.
pub struct Manifest<R> {
    reader: R,
    origin: String,
    line_number: usize,
    buf: Vec<u8>,
    done: bool,
}

/// Entries of a manifest file on disk.
pub type ManifestEntries = Manifest<BufReader<File>>;

impl Manifest<BufReader<File>> {
    pub fn open(path: &Path) -> BatchResult<ManifestEntries> {
        let file = File::open(path).map_err(|e| BatchError::Manifest {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Manifest::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> Manifest<R> {
    /// Read entries from any buffered reader. `origin` names it in errors.
    pub fn from_reader(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader,
            origin: origin.into(),
            line_number: 0,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Manifest<R> {
    type Item = BatchResult<ManifestEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;
                    let line = match std::str::from_utf8(&self.buf) {
                        Ok(line) => line.trim(),
                        Err(e) => {
                            return Some(Err(self.line_error(
                                String::from_utf8_lossy(&self.buf).trim().to_string(),
                                io::Error::new(io::ErrorKind::InvalidData, e),
                            )));
                        }
                    };
                    if line.is_empty() {
                        continue;
                    }
                    return Some(Ok(ManifestEntry {
                        line_number: self.line_number,
                        path: PathBuf::from(line),
                    }));
                }
                Err(e) => {
                    self.done = true;
                    self.line_number += 1;
                    return Some(Err(self.line_error(String::new(), e)));
                }
            }
        }
        None
    }
}

impl<R> Manifest<R> {
    fn line_error(&self, line: String, source: io::Error) -> BatchError {
        BatchError::ManifestLine {
            path: self.origin.clone(),
            line_number: self.line_number,
            line,
            source,
        }
    }
}
