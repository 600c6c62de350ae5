// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each concern has its own subdirectory with value objects, errors and, where
// it has behaviour beyond validation, the ports it depends on.
//
// ============================================================================

pub mod catalog;
pub mod identity;
pub mod money;
pub mod order;
