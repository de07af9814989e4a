use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{BookRecord, BookUpdate, NewBook};
use super::tables::*;

impl Database {
    // ========================================================================
    // Book operations
    // ========================================================================

    /// Insert a new book, assigning the next id from the book sequence.
    /// Ids are never reused, even after the highest book is deleted.
    pub fn insert_book(&self, book: NewBook) -> Result<BookRecord, DatabaseError> {
        let write_txn = self.begin_write()?;
        let record = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = sequences
                .get(BOOK_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            sequences.insert(BOOK_SEQUENCE, id)?;

            let now = Utc::now();
            let record = BookRecord {
                id,
                created_at: now,
                updated_at: now,
                title: book.title,
                description: book.description,
                author: book.author,
                progress: book.progress,
                cover_id: book.cover_id,
                owner_email: book.owner_email,
                is_public: book.is_public,
            };

            let mut table = write_txn.open_table(BOOKS)?;
            let data = rmp_serde::to_vec_named(&record)?;
            table.insert(id, data.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Get a book by id
    pub fn get_book(&self, id: u64) -> Result<Option<BookRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        match table.get(id)? {
            Some(data) => {
                let book: BookRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    /// All books in id (insertion) order
    pub fn list_books(&self) -> Result<Vec<BookRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        let mut books = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let book: BookRecord = rmp_serde::from_slice(value.value())?;
            books.push(book);
        }

        Ok(books)
    }

    /// Overwrite a book's mutable fields. Returns false when no book has this id.
    pub fn update_book(&self, id: u64, update: &BookUpdate) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(BOOKS)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let book: BookRecord = rmp_serde::from_slice(data.value())?;
                    Some(book)
                }
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut book) => {
                book.title = update.title.clone();
                book.description = update.description.clone();
                book.author = update.author.clone();
                book.progress = update.progress;
                if let Some(is_public) = update.is_public {
                    book.is_public = is_public;
                }
                book.updated_at = Utc::now();

                let serialized = rmp_serde::to_vec_named(&book)?;
                let mut table = write_txn.open_table(BOOKS)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a book by id. Returns false when no book has this id.
    pub fn delete_book(&self, id: u64) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(BOOKS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Whether any stored book is owned by this identity
    pub fn owner_has_books(&self, email: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;

        for result in table.iter()? {
            let (_, value) = result?;
            let book: BookRecord = rmp_serde::from_slice(value.value())?;
            if book.is_owned_by(email) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
