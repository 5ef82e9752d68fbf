use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use codec::{Category, Cell};
use crc32fast::Hasher as Crc32;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use crate::{CanonicalRow, PersistedRow, StoreError};

/// Size of a record body: id + idtype + unit_id + val_index + value + table_ty.
pub const BODY_BYTES: usize = 8 + 4 + 4 + 4 + 8 + 1;

const RECORD_LEN: u32 = BODY_BYTES as u32 + 4;
const FRAME_BYTES: u64 = 4 + RECORD_LEN as u64;

/// Append-only row log writer.
///
/// Each record is built in a scratch buffer and written with a single
/// `write_all`. When `sync` is `true`, every append is followed by
/// `sync_all()`.
pub struct RowLogWriter {
    file: File,
    sync: bool,
    /// Reusable scratch buffer to avoid allocation on every append.
    buf: Vec<u8>,
}

impl RowLogWriter {
    /// Opens (or creates) a row log in append mode.
    pub fn create<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self, StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            sync,
            buf: Vec::with_capacity(FRAME_BYTES as usize),
        })
    }

    /// Serializes `record` and appends it to the log.
    ///
    /// Layout:
    /// [record_len: u32 LE][crc32: u32 LE][body bytes...]
    pub fn append(&mut self, record: &PersistedRow) -> Result<(), StoreError> {
        self.buf.clear();

        // frame header (record_len + crc) is filled in once the body is known
        self.buf.extend_from_slice(&[0u8; 8]);

        let row = &record.row;
        self.buf.write_u64::<LittleEndian>(record.id)?;
        self.buf.write_u32::<LittleEndian>(row.idtype)?;
        self.buf.write_u32::<LittleEndian>(row.unit_id)?;
        self.buf.write_u32::<LittleEndian>(row.val_index)?;
        self.buf.write_u64::<LittleEndian>(row.value.raw())?;
        self.buf.write_u8(row.table_ty as u8)?;

        let mut hasher = Crc32::new();
        hasher.update(&self.buf[8..]);
        let crc = hasher.finalize();

        self.buf[0..4].copy_from_slice(&RECORD_LEN.to_le_bytes());
        self.buf[4..8].copy_from_slice(&crc.to_le_bytes());

        self.file.write_all(&self.buf)?;
        self.file.flush()?;

        if self.sync {
            self.file.sync_all()?;
        }

        Ok(())
    }

    /// Forces everything appended so far to disk.
    pub fn sync_to_disk(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Sequential row log reader.
///
/// Generic over any `Read` so tests can replay in-memory buffers.
pub struct RowLogReader<R: Read> {
    rdr: BufReader<R>,
}

impl RowLogReader<File> {
    /// Opens an existing row log for replay.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<RowLogReader<File>, StoreError> {
        let f = File::open(path)?;
        Ok(RowLogReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> RowLogReader<R> {
    pub fn from_reader(reader: R) -> Self {
        RowLogReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Replays every complete record, calling `apply` for each one.
    ///
    /// Returns the number of bytes occupied by complete records. Anything
    /// past that is a truncated tail (a crash mid-append) and is ignored.
    ///
    /// # Errors
    ///
    /// - Wrong `record_len`, CRC mismatch or unknown category ->
    ///   [`StoreError::Corrupt`].
    /// - Any error returned by `apply` is propagated as-is.
    pub fn replay<F>(&mut self, mut apply: F) -> Result<u64, StoreError>
    where
        F: FnMut(PersistedRow) -> Result<(), StoreError>,
    {
        let mut body = [0u8; BODY_BYTES];
        let mut valid = 0u64;

        loop {
            let record_len = match self.rdr.read_u32::<LittleEndian>() {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(valid),
                Err(e) => return Err(StoreError::Io(e)),
            };
            if record_len != RECORD_LEN {
                return Err(StoreError::Corrupt);
            }

            let crc = match self.rdr.read_u32::<LittleEndian>() {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(valid),
                Err(e) => return Err(StoreError::Io(e)),
            };

            match self.rdr.read_exact(&mut body) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(valid),
                Err(e) => return Err(StoreError::Io(e)),
            }

            let mut hasher = Crc32::new();
            hasher.update(&body);
            if hasher.finalize() != crc {
                return Err(StoreError::Corrupt);
            }

            let mut br = &body[..];
            let id = br.read_u64::<LittleEndian>()?;
            let idtype = br.read_u32::<LittleEndian>()?;
            let unit_id = br.read_u32::<LittleEndian>()?;
            let val_index = br.read_u32::<LittleEndian>()?;
            let value = Cell(br.read_u64::<LittleEndian>()?);
            let table_ty =
                Category::from_index(usize::from(br.read_u8()?)).ok_or(StoreError::Corrupt)?;

            apply(PersistedRow {
                id,
                row: CanonicalRow {
                    idtype,
                    unit_id,
                    val_index,
                    value,
                    table_ty,
                },
            })?;
            valid += FRAME_BYTES;
        }
    }
}
