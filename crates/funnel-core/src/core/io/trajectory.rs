use crate::core::models::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row: a particle's in-plane position at one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub sample: usize,
    pub step: u64,
    pub time_ps: f64,
    pub particle: usize,
    pub x: f64,
    pub y: f64,
}

/// Streams snapshots to CSV with columns `sample,step,time_ps,particle,x,y`.
pub struct TrajectoryWriter<W: Write> {
    writer: csv::Writer<W>,
    label: String,
    rows: usize,
}

impl TrajectoryWriter<File> {
    pub fn create(path: &Path) -> Result<Self, TrajectoryError> {
        let file = File::create(path).map_err(|e| TrajectoryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self::labelled(file, path.to_string_lossy()))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::labelled(inner, "<stream>")
    }

    /// Like [`new`](Self::new); `label` names the destination in I/O errors.
    pub fn labelled(inner: W, label: impl Into<String>) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            label: label.into(),
            rows: 0,
        }
    }

    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), TrajectoryError> {
        for (particle, row) in snapshot.xy.outer_iter().enumerate() {
            self.writer.serialize(TrajectoryRecord {
                sample: snapshot.sample,
                step: snapshot.step,
                time_ps: snapshot.time_ps,
                particle,
                x: row[0],
                y: row[1],
            })?;
            self.rows += 1;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), TrajectoryError> {
        self.writer.flush().map_err(|e| TrajectoryError::Io {
            path: self.label.clone(),
            source: e,
        })
    }

    pub fn into_inner(self) -> Result<W, TrajectoryError> {
        self.writer
            .into_inner()
            .map_err(|e| TrajectoryError::Csv(csv::Error::from(e.into_error())))
    }
}

/// Reads back every record of a trajectory CSV file.
pub fn read_records(path: &Path) -> Result<Vec<TrajectoryRecord>, TrajectoryError> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<TrajectoryRecord>()
        .map(|r| r.map_err(TrajectoryError::from))
        .collect()
}
