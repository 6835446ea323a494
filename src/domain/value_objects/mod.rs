pub mod collection_kind;
pub mod local_entry_id;
pub mod owner_id;
pub mod quantity;
pub mod remote_entry_id;
pub mod subject_id;

pub use collection_kind::CollectionKind;
pub use local_entry_id::LocalEntryId;
pub use owner_id::OwnerId;
pub use quantity::Quantity;
pub use remote_entry_id::RemoteEntryId;
pub use subject_id::SubjectId;
