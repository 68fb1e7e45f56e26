//! Story use-case services.
//!
//! # Responsibility
//! - Own transaction boundaries: every public call acquires one connection
//!   from `StoryDb`, runs one transaction and releases the connection.
//! - Translate repository results into caller-facing `StoryError`s.
//!
//! # Invariants
//! - Writes use IMMEDIATE transactions; reads use one deferred transaction
//!   so every read observes a single committed snapshot.
//! - Appends to one story are serialized by `StoryLocks`; appends to
//!   different stories never share an in-process lock.

pub mod append_coordinator;
pub mod error;
pub mod story_locks;
pub mod story_registry;
pub mod visibility;
