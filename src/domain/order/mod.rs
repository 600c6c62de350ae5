// ============================================================================
// Order Domain - building and placing the order aggregate
// ============================================================================
//
// - Value objects (ReferenceCode, OrderItem, OrderStatus)
// - Reference code generation
// - Aggregate (Order) and its builder
// - Commands and the place-order handler
//
// ============================================================================

pub mod value_objects;
pub mod reference;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use reference::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
