mod schema;
mod slots;
mod types;

pub use schema::Database;
pub use slots::SlotStore;
pub use types::DatabaseError;
