// ============================================================================
// Catalog Domain - categories and products
// ============================================================================

pub mod errors;
pub mod slug;
pub mod value_objects;

pub use errors::*;
pub use slug::*;
pub use value_objects::*;
