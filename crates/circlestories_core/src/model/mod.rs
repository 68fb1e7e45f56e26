//! Domain model for collaboratively authored stories.
//!
//! # Responsibility
//! - Define the canonical story, block and view shapes used by the engine.
//! - Own input validation for titles, block text and user identifiers.
//!
//! # Invariants
//! - Every story is identified by a stable `StoryId` that is never reused.
//! - A story always owns at least one block (block 0, written by its creator).
//! - Blocks are append-only; sequence indices are gapless per story.

pub mod block;
pub mod story;
pub mod user;
pub mod view;
