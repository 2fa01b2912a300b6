//! Contains the definition of [`Options`].

use getset::CopyGetters;

/// The default for [`Options::preallocation_limit`].
pub const DEFAULT_PREALLOCATION_LIMIT: usize = 64 * 1024;

/// Tunes how a [`crate::Decoder`] allocates while reading.
///
/// Counts and lengths come from the wire, so they are never trusted for an
/// up-front allocation beyond `preallocation_limit` elements or bytes; larger
/// containers still decode, growing as their elements arrive.
///
/// # Example
///
/// ```rust
/// use tessera_codec::Options;
///
/// let options = Options::builder().preallocation_limit(16).build();
/// assert_eq!(options.preallocation_limit(), 16);
/// assert_eq!(Options::default().preallocation_limit(), 64 * 1024);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    CopyGetters,
    serde::Serialize,
    serde::Deserialize,
    typed_builder::TypedBuilder,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// The maximum number of elements or bytes reserved before reading a
    /// container or string.
    #[get_copy = "pub"]
    #[builder(default = DEFAULT_PREALLOCATION_LIMIT)]
    pub(crate) preallocation_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { preallocation_limit: DEFAULT_PREALLOCATION_LIMIT }
    }
}

impl Options {
    /// Returns the capacity to reserve for `count` incoming elements.
    #[must_use]
    pub fn capacity_for(&self, count: usize) -> usize {
        count.min(self.preallocation_limit)
    }
}

#[cfg(test)]
mod test;
