//! Game event log: a binary protobuf file, one per game.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - Appends only; the single exception is undo, which drops the last frame
//!   - fsync after every write
//!   - Sequence strictly increasing from 1 (validated on append)

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use thiserror::Error;
use tracing::debug;

use scorebook_engine::GameEvent;

use crate::proto_bridge::{event_to_proto, proto_to_event, BridgeError};
use crate::proto_types::ProtoEventRecord;

const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("event log I/O: {0}")]
    Io(#[from] io::Error),
    #[error("sequence violation in event log: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },
    #[error("invalid frame length: {0}")]
    InvalidFrameLength(usize),
    #[error("truncated frame after sequence {0}")]
    TruncatedFrame(u64),
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Event log backed by a binary file.
pub struct EventStore {
    path: PathBuf,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create an event log at the given path.
    /// Reads existing frames to determine the last sequence number.
    pub fn open(path: &Path) -> Result<Self, EventStoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            let records = read_all_from_file(path)?;
            records.last().map(|r| r.sequence).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event with the next sequence number and return it.
    pub fn append(&mut self, event: &GameEvent) -> Result<u64, EventStoreError> {
        let sequence = self.last_sequence + 1;
        self.append_record(&event_to_proto(sequence, event))?;
        Ok(sequence)
    }

    /// Append a prepared record. Validates strict sequence ordering,
    /// writes the frame and fsyncs.
    pub fn append_record(&mut self, record: &ProtoEventRecord) -> Result<(), EventStoreError> {
        let expected = self.last_sequence + 1;
        if record.sequence != expected {
            return Err(EventStoreError::SequenceViolation {
                expected,
                got: record.sequence,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write_frame(&mut file, record)?;
        file.sync_all()?;

        self.last_sequence = record.sequence;
        Ok(())
    }

    /// Load every event in sequence order.
    pub fn load_all(&self) -> Result<Vec<GameEvent>, EventStoreError> {
        self.load_records()?
            .iter()
            .map(|r| proto_to_event(r).map_err(EventStoreError::from))
            .collect()
    }

    /// Load the raw records in sequence order.
    pub fn load_records(&self) -> Result<Vec<ProtoEventRecord>, EventStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_all_from_file(&self.path)
    }

    /// Drop the last event (undo). Returns it, or `None` on an empty log.
    pub fn truncate_last(&mut self) -> Result<Option<GameEvent>, EventStoreError> {
        let mut records = self.load_records()?;
        let Some(last) = records.pop() else {
            return Ok(None);
        };
        let removed = proto_to_event(&last)?;
        self.write_records(&records)?;
        debug!(sequence = last.sequence, "event log truncated");
        Ok(Some(removed))
    }

    /// Replace the whole log with `events`, renumbered from 1.
    pub fn rewrite(&mut self, events: &[GameEvent]) -> Result<(), EventStoreError> {
        let records: Vec<ProtoEventRecord> = events
            .iter()
            .enumerate()
            .map(|(i, e)| event_to_proto(i as u64 + 1, e))
            .collect();
        self.write_records(&records)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn len(&self) -> usize {
        self.last_sequence as usize
    }

    pub fn is_empty(&self) -> bool {
        self.last_sequence == 0
    }

    /// Write `records` to a sibling temp file and rename it over the log.
    fn write_records(&mut self, records: &[ProtoEventRecord]) -> Result<(), EventStoreError> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            for record in records {
                write_frame(&mut file, record)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.last_sequence = records.last().map(|r| r.sequence).unwrap_or(0);
        Ok(())
    }
}

fn write_frame(file: &mut File, record: &ProtoEventRecord) -> io::Result<()> {
    let buf = record.encode_to_vec();
    let len = buf.len() as u32;
    let mut writer = BufWriter::new(file);
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&buf)?;
    writer.flush()
}

/// Read all records from a file, validating frame integrity.
fn read_all_from_file(path: &Path) -> Result<Vec<ProtoEventRecord>, EventStoreError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut records: Vec<ProtoEventRecord> = Vec::new();
    let mut len_buf = [0u8; 4];

    loop {
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len == 0 || len > MAX_FRAME_LEN {
            return Err(EventStoreError::InvalidFrameLength(len));
        }

        let last = records.last().map(|r| r.sequence).unwrap_or(0);
        let mut frame = vec![0u8; len];
        reader
            .read_exact(&mut frame)
            .map_err(|_| EventStoreError::TruncatedFrame(last))?;

        let record = ProtoEventRecord::decode(frame.as_slice())?;
        if record.sequence != last + 1 {
            return Err(EventStoreError::SequenceViolation {
                expected: last + 1,
                got: record.sequence,
            });
        }
        records.push(record);
    }

    Ok(records)
}
