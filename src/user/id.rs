//! Identifier logic management.

use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::user::error::{Result, UserError};

/// Raw identifier length, in bytes.
const ID_BYTES: usize = 12;
/// Counter wraps on 24 bits.
const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Random value generated once per process.
static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(|| {
    let mut bytes = [0u8; 5];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
});

/// Incremented on every generated identifier, randomly seeded.
static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| {
    AtomicU32::new(rand::rngs::OsRng.next_u32() & COUNTER_MASK)
});

/// Value object of a well-formed user identifier.
///
/// Encoded as 24 lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Converts a string into a valid [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidArgument`] if the string is not exactly
    /// 24 hexadecimal characters.
    pub fn parse(id: &str) -> Result<Self> {
        <[u8; ID_BYTES]>::try_from(hex::decode(id).map_err(|_| UserError::InvalidArgument)?)
            .map(|bytes| Self(hex::encode(bytes)))
            .map_err(|_| UserError::InvalidArgument)
    }

    /// Generate a new unique identifier.
    ///
    /// Layout: 4-byte creation time in seconds, 5-byte process value and a
    /// 3-byte counter, all big-endian.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(hex::encode(bytes))
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}
