//! A compact, hand-rolled binary serialization codec.
//!
//! Values are written to any [`std::io::Write`] and read back from any
//! [`std::io::Read`] through the [`DataOutput`] and [`DataInput`] extension
//! traits. Composite values are driven explicitly by the caller: containers
//! are framed by the functions in [`container`] and arbitrary types are
//! handled by [`BinarySerializer`]s looked up in a [`Registry`].
//!
//! # Wire format
//!
//! ```text
//! value frame     = null_mark:u8 payload?          (payload iff null_mark == 0)
//! varint          = { 1xxxxxxx }* 0xxxxxxx         (low-order group first)
//! string frame    = varint(byte_len) modified_utf8[byte_len]
//! container frame = null_mark:u8 varint(count) element_frame{count}
//! ```
//!
//! Fixed-width integers are big-endian two's complement; floating-point
//! values are written as their bit pattern.
//!
//! # Example
//!
//! ```rust
//! use tessera_codec::{DataInput, DataOutput};
//!
//! let mut buffer = Vec::new();
//! buffer.write_string(Some("abc")).unwrap();
//!
//! assert_eq!(buffer, [0x00, 0x03, 0x61, 0x62, 0x63]);
//!
//! let mut source = buffer.as_slice();
//! assert_eq!(source.read_string(false).unwrap().as_deref(), Some("abc"));
//! ```

pub mod container;
pub mod context;
pub mod data;
pub mod error;
pub mod null;
pub mod options;
pub mod primitive;
pub mod registry;
pub mod serializer;
pub mod string;
pub mod varint;

pub use context::{Decoder, Encoder};
pub use data::{DataInput, DataOutput};
pub use error::{Error, MalformedString, RegistryError, Result};
pub use options::Options;
pub use primitive::Primitive;
pub use registry::{Registrar, Registry, SharedRegistry};
pub use serializer::{BinarySerializer, Object};
pub use varint::VarInt;
