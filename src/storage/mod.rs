pub mod faces;
mod identity;
mod locks;
pub mod sqlite;
pub mod traits;

pub use faces::FaceStore;
pub use identity::IdentityStorage;
pub use sqlite::SqliteRowStore;
pub use traits::RowStore;
