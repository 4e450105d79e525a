//! Configuration for the CBOR encoder.

/// Configuration options for [`CborEncoder`](crate::cbor::CborEncoder).
#[derive(Debug, Clone, Copy)]
pub struct CborEncodeOptions {
    /// Maximum container nesting depth, enforced on every container open.
    ///
    /// # Default
    ///
    /// `1024`
    pub max_nesting_depth: usize,

    /// Enables string-reference packing: the outermost value is prefixed
    /// with tag 256 and repeated strings are emitted as tag-25 references
    /// to their first occurrence.
    ///
    /// # Default
    ///
    /// `false`
    pub pack_strings: bool,

    /// Emit typed-array events as RFC 8746 typed arrays (tags 0x40-0x57
    /// wrapping a platform-endian byte string). When `false`, typed arrays
    /// are written as ordinary arrays of their scalars.
    ///
    /// # Default
    ///
    /// `false`
    pub use_typed_arrays: bool,
}

impl Default for CborEncodeOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 1024,
            pack_strings: false,
            use_typed_arrays: false,
        }
    }
}
