//! TypeScript AST and its printer.
//!
//! Code generation builds structured values from [`types`]; [`Emit`] turns
//! them into source text. Emission is purely mechanical string building, so
//! every formatting decision is testable in isolation.

mod emit;
pub mod types;
pub mod utils;

pub use emit::Emit;
