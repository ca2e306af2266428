//! Record streaming for staged objects
//!
//! Classifies a staged file as gzip or plain text from its magic number and
//! reads its non-blank lines, in order, into a [`RecordQueue`].

use crate::constants::GZIP_MAGIC;
use crate::error::{ProcessorError, Result};
use crate::models::RecordQueue;

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

/// Encoding of a staged object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Plain,
}

impl Compression {
    /// Classify from leading bytes; fewer than two bytes is plain text
    pub fn from_magic(leading: &[u8]) -> Self {
        if leading.len() >= GZIP_MAGIC.len() && leading[..GZIP_MAGIC.len()] == GZIP_MAGIC {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Compression::Gzip)
    }
}

/// Inspect the first two bytes of a reader and rewind it
pub fn detect_compression<R: Read + Seek>(reader: &mut R) -> Result<Compression> {
    let start = reader.stream_position()?;
    let mut leading = Vec::with_capacity(GZIP_MAGIC.len());
    reader
        .by_ref()
        .take(GZIP_MAGIC.len() as u64)
        .read_to_end(&mut leading)?;
    reader.seek(SeekFrom::Start(start))?;

    Ok(Compression::from_magic(&leading))
}

/// Classify a file through a fresh handle
pub fn detect_compression_at(path: &Path) -> Result<Compression> {
    let mut file = File::open(path)?;
    detect_compression(&mut file)
}

impl RecordQueue {
    /// Queue every non-blank line of a reader, keeping lines as read
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut queue = RecordQueue::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                queue.push(line);
            }
        }
        Ok(queue)
    }
}

/// Read the records of a staged file, decompressing every gzip member when needed
pub fn read_records(path: &Path, compression: Compression) -> Result<RecordQueue> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = match compression {
        Compression::Gzip => {
            debug!("file is gz compressed");
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        }
        Compression::Plain => {
            debug!("file is not compressed");
            Box::new(BufReader::new(file))
        }
    };

    let queue = RecordQueue::from_reader(reader).map_err(|e| ProcessorError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if queue.is_empty() {
        warn!(
            "Could not find any records to be validated in {}",
            path.display()
        );
    }
    debug!("Line count: {}", queue.len());

    Ok(queue)
}

/// Detect the encoding of a staged file and read its records
pub fn stream_records(path: &Path) -> Result<(Compression, RecordQueue)> {
    let compression = detect_compression_at(path)?;
    let queue = read_records(path, compression)?;
    Ok((compression, queue))
}
