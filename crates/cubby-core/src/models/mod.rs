pub mod identity;
pub mod object;

pub use identity::Identity;
pub use object::StoredObject;
