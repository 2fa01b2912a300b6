//! Checksum decorator streams.
//!
//! [`ChecksumWriter`] and [`ChecksumReader`] wrap a byte sink or source,
//! forward every byte unchanged and digest it with a [`Checksum`] on the way
//! through. Combined with the codec they give integrity-checked streams: the
//! writer appends the digest as a trailing 8-byte big-endian signature with
//! [`ChecksumWriter::sign`], and the reader compares it with
//! [`ChecksumReader::verify`].
//!
//! # Example
//!
//! ```rust
//! use tessera_checksum::{Adler32, ChecksumReader, ChecksumWriter};
//! use tessera_codec::{DataInput, DataOutput};
//!
//! let mut writer = ChecksumWriter::<_, Adler32>::new(Vec::new());
//! writer.write_string(Some("payload")).unwrap();
//! writer.sign().unwrap();
//!
//! let bytes = writer.into_inner();
//! let mut reader = ChecksumReader::<_, Adler32>::new(bytes.as_slice());
//!
//! assert_eq!(reader.read_string(false).unwrap().as_deref(), Some("payload"));
//! assert!(reader.verify(None).unwrap());
//! ```

pub mod checksum;
pub mod stream;

pub use checksum::{Adler32, Checksum, Crc32};
pub use stream::{ChecksumReader, ChecksumWriter, SIGNATURE_LEN};
