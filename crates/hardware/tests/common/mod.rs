//! Shared test infrastructure.

/// Instruction encoders and image builders.
pub mod builder;


pub use builder::instruction as asm;
pub use harness::TestContext;
