use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::Deref, str::FromStr};

/// Data that is a cryptographic hash of `BYTES` long.
///
/// A fixed-size byte array that provides:
/// - Hexadecimal serialization/deserialization
/// - Type-safe conversions from various byte representations
/// - Display and debug formatting
///
/// # Common Hash Sizes in Arbor
///
/// - **32 bytes**: Block hashes, transaction hashes
/// - **28 bytes**: Address hashes
///
/// # Examples
///
/// ```
/// use arbor_common::Hash;
///
/// let hash: Hash<4> = "0d8d00cd".parse().unwrap();
/// assert_eq!(hash.to_string(), "0d8d00cd");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Default for Hash<BYTES> {
    fn default() -> Self {
        Self::new([0u8; BYTES])
    }
}

// Generic const arrays don't auto-derive serde, so go via hex strings
impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl<const BYTES: usize> Hash<BYTES> {
    /// Creates a new hash from a byte array.
    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    /// Converts the hash to a `Vec<u8>`.
    #[inline]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Consumes the hash and returns the inner byte array.
    #[inline]
    pub fn into_inner(self) -> [u8; BYTES] {
        self.0
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Hash<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = std::array::TryFromSliceError;

    /// Attempts to create a hash from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length does not match `BYTES`.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let hash: [u8; BYTES] = value.try_into()?;
        Ok(Self::new(hash))
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Hash<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Hash<{BYTES}>")).field(&hex::encode(self)).finish()
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    /// Formats the hash as a lowercase hexadecimal string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    /// Parses a hash from a hexadecimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hexadecimal or the
    /// decoded bytes do not match the expected length `BYTES`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::new(bytes))
    }
}

/// Declares a type alias for a hash with optional documentation.
#[macro_export]
macro_rules! declare_hash_type {
    ($name:ident, $size:expr) => {
        #[doc = concat!(stringify!($name), " - a ", stringify!($size), "-byte hash.")]
        pub type $name = $crate::hash::Hash<$size>;
    };
    ($(#[$meta:meta])* $name:ident, $size:expr) => {
        $(#[$meta])*
        pub type $name = $crate::hash::Hash<$size>;
    };
}

declare_hash_type!(
    /// Identity of a block: Blake2b-256 over its contents.
    BlockHash,
    32
);
declare_hash_type!(
    /// Identity of a transaction: Blake2b-256 over its contents.
    TxHash,
    32
);
declare_hash_type!(AddressHash, 28);
