//! Application layer orchestrating domain logic and infrastructure.

pub mod assemble;
pub mod binary;
pub mod expand;
pub mod ignore;
pub mod render;
pub mod selection;
pub mod tree;
