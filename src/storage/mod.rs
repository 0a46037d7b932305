mod kv;
mod schema;
mod types;

pub use kv::KeyValueStore;
pub use schema::Database;
pub use types::DatabaseError;
