//! Contains the error taxonomy of the codec.

use std::io;

/// The result type used throughout the codec.
pub type Result<T> = std::result::Result<T, Error>;

/// The reason a modified UTF-8 payload could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MalformedString {
    /// A multi-byte sequence needs more bytes than the declared length has
    /// left.
    #[error("partial character at end of input (byte {offset})")]
    Truncated {
        /// The offset of the lead byte of the sequence.
        offset: usize,
    },

    /// A continuation byte doesn't have the `10xxxxxx` form.
    #[error("malformed input around byte {offset}")]
    InvalidContinuation {
        /// The offset of the offending continuation byte.
        offset: usize,
    },

    /// The byte can't start a sequence (`10xxxxxx` or `1111xxxx`).
    #[error("malformed input around byte {offset}")]
    InvalidLead {
        /// The offset of the offending byte.
        offset: usize,
    },

    /// The decoded code units aren't valid UTF-16 (lone surrogate).
    #[error("decoded code units contain an unpaired surrogate")]
    UnpairedSurrogate,
}

/// The serializer registry couldn't produce a serializer for a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RegistryError {
    /// Neither the concrete map nor the interface map has an entry for the
    /// type.
    #[error("no binary serializer registered for `{type_name}`")]
    NotRegistered {
        /// The name of the requested type.
        type_name: &'static str,
    },

    /// The type implements several registered interfaces and none of them is
    /// more specific than all the others.
    #[error(
        "ambiguous serializer resolution for `{type_name}`, candidates: \
         {candidates:?}"
    )]
    Ambiguous {
        /// The name of the requested type.
        type_name: &'static str,

        /// The names of the matching interfaces.
        candidates: Vec<&'static str>,
    },
}

/// An error raised while encoding or decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source ran out of bytes in the middle of a frame.
    #[error("unexpected end of input")]
    EndOfInput,

    /// The underlying stream failed.
    #[error(transparent)]
    Io(io::Error),

    /// The terminal byte of a varint exceeds the bound of its width.
    #[error("malformed variant length encoded {kind}")]
    MalformedVarInt {
        /// The name of the integer type being decoded.
        kind: &'static str,
    },

    /// A string payload isn't valid modified UTF-8.
    #[error("malformed modified UTF-8 string: {0}")]
    MalformedString(#[from] MalformedString),

    /// A `char` was decoded as a lone surrogate code unit.
    #[error("decoded char {unit:#06x} is a lone surrogate")]
    MalformedChar {
        /// The decoded UTF-16 code unit.
        unit: u16,
    },

    /// A null marker was found where the caller doesn't allow null.
    #[error("found a null value where a value is required")]
    UnexpectedNull,

    /// The serializer registry couldn't provide a serializer.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A serializer produced a value of a different type than requested.
    #[error(
        "serializer for `{expected}` produced a value of type `{found}`"
    )]
    Cast {
        /// The requested type.
        expected: &'static str,

        /// The type actually produced.
        found: &'static str,
    },

    /// A negative value was given to the varint encoder.
    #[error("can't encode negative value {value} as a varint")]
    NegativeVarInt {
        /// The rejected value.
        value: i64,
    },

    /// The encoded string doesn't fit the length prefix.
    #[error("encoded string length {length} exceeds the frame limit")]
    StringTooLong {
        /// The encoded length in bytes.
        length: usize,
    },

    /// The character doesn't fit in a single UTF-16 code unit.
    #[error("char {character:?} is outside the basic multilingual plane")]
    UnrepresentableChar {
        /// The rejected character.
        character: char,
    },

    /// The container has more elements than the count prefix can carry.
    #[error("container of {count} elements exceeds the frame limit")]
    CountOverflow {
        /// The number of elements.
        count: usize,
    },
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::EndOfInput
        } else {
            Self::Io(error)
        }
    }
}
