use redb::TableDefinition;

/// Book records: id -> BookRecord (msgpack)
pub const BOOKS: TableDefinition<u64, &[u8]> = TableDefinition::new("buku");

/// Monotonic id sequences: sequence name -> last assigned id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Sequence key for book ids
pub const BOOK_SEQUENCE: &str = "buku";
