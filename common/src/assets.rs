//! Decode-once cache for embedded image assets.
//!
//! Assets are linked into the image as encoded bytes and decoded the first
//! time they are needed:
//!
//! ```text
//! Pending(bytes) ──decode ok──▶ Ready(T)
//!        │
//!        └──────decode err────▶ Failed
//! ```
//!
//! `Ready` and `Failed` are terminal: a broken asset is not decoded again on
//! every frame.

/// Lazily decoded asset.
#[derive(Debug)]
pub enum LazyAsset<T> {
    /// Encoded bytes, not decoded yet.
    Pending(&'static [u8]),
    /// Decoded value.
    Ready(T),
    /// Decoding failed; never retried.
    Failed,
}

impl<T> LazyAsset<T> {
    /// Wrap encoded bytes.
    pub const fn new(bytes: &'static [u8]) -> Self { Self::Pending(bytes) }

    /// Decode on first use and return the value, or `None` if decoding failed
    /// now or on an earlier call.
    ///
    /// `on_error` runs only for the call that performed the failed decode.
    pub fn get_or_decode<E>(
        &mut self,
        decode: impl FnOnce(&[u8]) -> Result<T, E>,
        on_error: impl FnOnce(E),
    ) -> Option<&T> {
        if let Self::Pending(bytes) = *self {
            *self = match decode(bytes) {
                Ok(value) => Self::Ready(value),
                Err(err) => {
                    on_error(err);
                    Self::Failed
                }
            };
        }
        match &*self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a decoded value is available.
    #[inline]
    pub const fn is_ready(&self) -> bool { matches!(self, Self::Ready(_)) }

    /// Whether decoding failed.
    #[inline]
    pub const fn is_failed(&self) -> bool { matches!(self, Self::Failed) }

    /// Number of decode attempts so far (0 or 1).
    #[inline]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Pending(_) => 0,
            _ => 1,
        }
    }
}
