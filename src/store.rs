use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::model::{Bookmark, NewBookmark};

/// In-memory, insertion-ordered bookmark collection. Lives as long as the process.
pub struct BookmarkStore {
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl BookmarkStore {
    pub fn new(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            bookmarks: Mutex::new(bookmarks),
        }
    }

    pub fn seeded() -> Self {
        Self::new(vec![Bookmark::seed()])
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Bookmark>>, StoreError> {
        self.bookmarks
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    pub fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self.lock()?.clone())
    }

    pub fn get(&self, id: &str) -> Result<Option<Bookmark>, StoreError> {
        Ok(self.lock()?.iter().find(|b| b.id == id).cloned())
    }

    /// Appends a new record under a fresh v4 uuid and returns it.
    pub fn insert(&self, new: NewBookmark) -> Result<Bookmark, StoreError> {
        let mut bookmarks = self.lock()?;
        let mut id = uuid::Uuid::new_v4().to_string();
        while bookmarks.iter().any(|b| b.id == id) {
            id = uuid::Uuid::new_v4().to_string();
        }
        let bookmark = new.into_bookmark(id);
        bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    /// Removes the record with `id`, keeping the order of the rest.
    pub fn remove(&self, id: &str) -> Result<Option<Bookmark>, StoreError> {
        let mut bookmarks = self.lock()?;
        match bookmarks.iter().position(|b| b.id == id) {
            Some(index) => Ok(Some(bookmarks.remove(index))),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }
}
