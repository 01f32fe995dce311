//! Fetch-once state of a lazily populated collection.

use crate::error::StreamerResult;

/// A collection that is fetched at most once.
///
/// `Fetched(vec![])` is distinct from `Unfetched`: a manifest that declares
/// nothing is still only asked once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Population<T> {
    Unfetched,
    Fetched(Vec<T>),
}

impl<T> Default for Population<T> {
    fn default() -> Self {
        Self::Unfetched
    }
}

impl<T> Population<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// The fetched items, or `None` before the fetch.
    pub fn get(&self) -> Option<&[T]> {
        match self {
            Self::Fetched(items) => Some(items),
            Self::Unfetched => None,
        }
    }

    /// The fetched items, empty before the fetch.
    pub fn items(&self) -> &[T] {
        self.get().unwrap_or(&[])
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        match self {
            Self::Fetched(items) => items,
            Self::Unfetched => &mut [],
        }
    }

    /// Run `fetch` unless already fetched. A failed fetch leaves the state unchanged.
    pub fn fill_with<F>(&mut self, fetch: F) -> StreamerResult<()>
    where
        F: FnOnce() -> StreamerResult<Vec<T>>,
    {
        if !self.is_fetched() {
            *self = Self::Fetched(fetch()?);
        }
        Ok(())
    }
}
