// ============================================================================
// Identity Domain - users and their shipping addresses
// ============================================================================

pub mod errors;
pub mod password;
pub mod value_objects;

pub use errors::*;
pub use password::*;
pub use value_objects::*;
