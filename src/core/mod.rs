//! Internal chunk representation shared by the chunking strategies.
//!
//! Conversation/session persistence (`Buffer`, `Context`) is out of scope
//! (see `DESIGN.md`); only the pure `Chunk` type chunking operates on
//! survives from the teacher's `core` module.

pub mod chunk;

pub use chunk::{Chunk, ChunkMetadata};
