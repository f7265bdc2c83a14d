//! Minimal single-pass writer for the document container.
//!
//! The container is a standard zip archive restricted to one shape: every member is
//! stored uncompressed, timestamps are zero and there are no extra fields or comments.
//! Output is laid out as
//!
//! ```text
//! [local header + name + payload] * n
//! [central directory header + name] * n
//! [end of central directory]
//! ```
//!
//! All numeric fields are little-endian and built from [`crate::codec`].

use crate::codec::{crc32, u16le, u32le};
use crate::{ReportError, ReportResult};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4B50;

/// Version 2.0: the minimum for stored entries with path-separator-bearing names.
const VERSION: u16 = 0x0014;
const METHOD_STORED: u16 = 0;

pub(crate) const LOCAL_HEADER_LEN: usize = 30;
pub(crate) const CENTRAL_HEADER_LEN: usize = 46;
pub(crate) const END_RECORD_LEN: usize = 22;

/// One archive member together with the values recorded for it in both headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub payload: &'a [u8],
    pub crc32: u32,
    /// Payload length; compressed and uncompressed sizes are equal.
    pub size: u32,
    /// Offset of this entry's local header from the start of the archive.
    pub start_offset: u32,
}

impl<'a> ArchiveEntry<'a> {
    fn name_len(&self) -> u16 {
        // Checked against u16::MAX in ArchiveWriter::add.
        self.name.len() as u16
    }

    fn local_record_len(&self) -> usize {
        LOCAL_HEADER_LEN + self.name.len() + self.payload.len()
    }
}

/// Collects entries and lays out the archive on [`finish`](ArchiveWriter::finish).
#[derive(Debug, Default)]
pub struct ArchiveWriter<'a> {
    entries: Vec<ArchiveEntry<'a>>,
    next_offset: u32,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a member. Offsets are assigned in insertion order.
    pub fn add(&mut self, name: &'a str, payload: &'a [u8]) -> ReportResult<&ArchiveEntry<'a>> {
        if name.is_empty() {
            return Err(ReportError::InvalidInput(
                "archive entry name cannot be empty".into(),
            ));
        }
        if name.len() > u16::MAX as usize {
            return Err(ReportError::Synthesis(format!(
                "archive entry name is {} bytes; the container allows at most {}",
                name.len(),
                u16::MAX
            )));
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(ReportError::Synthesis(
                "too many archive entries for the container".into(),
            ));
        }
        let size = u32::try_from(payload.len()).map_err(|_| {
            ReportError::Synthesis(format!(
                "archive entry {name} is {} bytes; the container allows at most {}",
                payload.len(),
                u32::MAX
            ))
        })?;

        let entry = ArchiveEntry {
            name,
            payload,
            crc32: crc32(payload),
            size,
            start_offset: self.next_offset,
        };

        self.next_offset = u32::try_from(entry.local_record_len())
            .ok()
            .and_then(|len| self.next_offset.checked_add(len))
            .ok_or_else(|| {
                ReportError::Synthesis("archive exceeds the 4 GiB container limit".into())
            })?;

        let index = self.entries.len();
        self.entries.push(entry);
        Ok(&self.entries[index])
    }

    pub fn entries(&self) -> &[ArchiveEntry<'a>] {
        &self.entries
    }

    /// Write all local records, the central directory and the end record.
    pub fn finish(self) -> ReportResult<Vec<u8>> {
        let central_dir_offset = self.next_offset;
        let central_dir_len: usize = self
            .entries
            .iter()
            .map(|e| CENTRAL_HEADER_LEN + e.name.len())
            .sum();
        let central_dir_size = u32::try_from(central_dir_len)
            .ok()
            .filter(|size| central_dir_offset.checked_add(*size).is_some())
            .ok_or_else(|| {
                ReportError::Synthesis("central directory exceeds the container limit".into())
            })?;

        let mut buf = Vec::with_capacity(
            central_dir_offset as usize + central_dir_len + END_RECORD_LEN,
        );

        for entry in &self.entries {
            debug_assert_eq!(buf.len(), entry.start_offset as usize);
            write_local_record(&mut buf, entry);
        }
        for entry in &self.entries {
            write_central_record(&mut buf, entry);
        }
        // Entry count cannot exceed u16::MAX; see add().
        write_end_record(
            &mut buf,
            self.entries.len() as u16,
            central_dir_size,
            central_dir_offset,
        );

        tracing::debug!(
            entries = self.entries.len(),
            bytes = buf.len(),
            "archive assembled"
        );
        Ok(buf)
    }
}

fn write_local_record(buf: &mut Vec<u8>, entry: &ArchiveEntry<'_>) {
    buf.extend_from_slice(&u32le(LOCAL_HEADER_SIGNATURE));
    buf.extend_from_slice(&u16le(VERSION));
    buf.extend_from_slice(&u16le(0)); // flags
    buf.extend_from_slice(&u16le(METHOD_STORED));
    buf.extend_from_slice(&u16le(0)); // mtime
    buf.extend_from_slice(&u16le(0)); // mdate
    buf.extend_from_slice(&u32le(entry.crc32));
    buf.extend_from_slice(&u32le(entry.size)); // compressed
    buf.extend_from_slice(&u32le(entry.size)); // uncompressed
    buf.extend_from_slice(&u16le(entry.name_len()));
    buf.extend_from_slice(&u16le(0)); // extra length
    buf.extend_from_slice(entry.name.as_bytes());
    buf.extend_from_slice(entry.payload);
}

fn write_central_record(buf: &mut Vec<u8>, entry: &ArchiveEntry<'_>) {
    buf.extend_from_slice(&u32le(CENTRAL_HEADER_SIGNATURE));
    buf.extend_from_slice(&u16le(VERSION)); // made by
    buf.extend_from_slice(&u16le(VERSION)); // needed to extract
    buf.extend_from_slice(&u16le(0)); // flags
    buf.extend_from_slice(&u16le(METHOD_STORED));
    buf.extend_from_slice(&u16le(0)); // mtime
    buf.extend_from_slice(&u16le(0)); // mdate
    buf.extend_from_slice(&u32le(entry.crc32));
    buf.extend_from_slice(&u32le(entry.size));
    buf.extend_from_slice(&u32le(entry.size));
    buf.extend_from_slice(&u16le(entry.name_len()));
    buf.extend_from_slice(&u16le(0)); // extra length
    buf.extend_from_slice(&u16le(0)); // comment length
    buf.extend_from_slice(&u16le(0)); // disk number start
    buf.extend_from_slice(&u16le(0)); // internal attributes
    buf.extend_from_slice(&u32le(0)); // external attributes
    buf.extend_from_slice(&u32le(entry.start_offset));
    buf.extend_from_slice(entry.name.as_bytes());
}

fn write_end_record(buf: &mut Vec<u8>, count: u16, central_dir_size: u32, central_dir_offset: u32) {
    buf.extend_from_slice(&u32le(END_OF_CENTRAL_DIRECTORY_SIGNATURE));
    buf.extend_from_slice(&u16le(0)); // this disk
    buf.extend_from_slice(&u16le(0)); // disk holding the central directory
    buf.extend_from_slice(&u16le(count)); // entries on this disk
    buf.extend_from_slice(&u16le(count)); // entries in total
    buf.extend_from_slice(&u32le(central_dir_size));
    buf.extend_from_slice(&u32le(central_dir_offset));
    buf.extend_from_slice(&u16le(0)); // comment length
}

/// Assemble `entries` into one archive buffer.
pub fn write_archive<'a, I>(entries: I) -> ReportResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = ArchiveWriter::new();
    for (name, payload) in entries {
        writer.add(name, payload)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn read_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn start_offsets_accumulate_local_record_lengths() {
        let mut writer = ArchiveWriter::new();
        writer.add("[Content_Types].xml", b"<Types/>").unwrap();
        writer.add("_rels/.rels", b"<Relationships/>").unwrap();
        writer.add("word/document.xml", b"<w:document/>").unwrap();

        let offsets: Vec<u32> = writer.entries().iter().map(|e| e.start_offset).collect();
        let first = (30 + "[Content_Types].xml".len() + "<Types/>".len()) as u32;
        let second = first + (30 + "_rels/.rels".len() + "<Relationships/>".len()) as u32;
        assert_eq!(offsets, vec![0, first, second]);
    }

    #[test]
    fn layout_of_a_single_entry() {
        let buf = write_archive([("a.txt", b"hello".as_slice())]).unwrap();

        let local_len = LOCAL_HEADER_LEN + 5 + 5;
        let central_len = CENTRAL_HEADER_LEN + 5;
        assert_eq!(buf.len(), local_len + central_len + END_RECORD_LEN);

        // Local header
        assert_eq!(read_u32(&buf, 0), LOCAL_HEADER_SIGNATURE);
        assert_eq!(read_u16(&buf, 4), 0x0014);
        assert_eq!(read_u16(&buf, 8), 0);
        assert_eq!(read_u32(&buf, 14), crc32(b"hello"));
        assert_eq!(read_u32(&buf, 18), 5);
        assert_eq!(read_u32(&buf, 22), 5);
        assert_eq!(read_u16(&buf, 26), 5);
        assert_eq!(read_u16(&buf, 28), 0);
        assert_eq!(&buf[30..35], b"a.txt");
        assert_eq!(&buf[35..40], b"hello");

        // Central directory
        let cd = local_len;
        assert_eq!(read_u32(&buf, cd), CENTRAL_HEADER_SIGNATURE);
        assert_eq!(read_u32(&buf, cd + 16), crc32(b"hello"));
        assert_eq!(read_u16(&buf, cd + 28), 5);
        assert_eq!(read_u32(&buf, cd + 42), 0);
        assert_eq!(&buf[cd + 46..cd + 51], b"a.txt");

        // End record
        let end = cd + central_len;
        assert_eq!(read_u32(&buf, end), END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(read_u16(&buf, end + 8), 1);
        assert_eq!(read_u16(&buf, end + 10), 1);
        assert_eq!(read_u32(&buf, end + 12), central_len as u32);
        assert_eq!(read_u32(&buf, end + 16), local_len as u32);
        assert_eq!(read_u16(&buf, end + 20), 0);
    }

    #[test]
    fn empty_archive_is_just_an_end_record() {
        let buf = ArchiveWriter::new().finish().unwrap();
        assert_eq!(buf.len(), END_RECORD_LEN);
        assert_eq!(read_u32(&buf, 0), END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(read_u16(&buf, 10), 0);
    }

    #[test]
    fn rejects_empty_and_oversized_names() {
        let long_name = "n".repeat(u16::MAX as usize + 1);
        let mut writer = ArchiveWriter::new();
        assert!(matches!(
            writer.add("", b"x"),
            Err(ReportError::InvalidInput(_))
        ));

        assert!(matches!(
            writer.add(&long_name, b"x"),
            Err(ReportError::Synthesis(_))
        ));
        assert!(writer.entries().is_empty());
    }
}
