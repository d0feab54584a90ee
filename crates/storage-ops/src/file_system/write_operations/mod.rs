//! Tree operations: recursive copy and move, delete, rename and directory creation.
//!
//! Every mutation goes through a [`Volume`](super::volume::Volume), so the same code serves
//! the direct attempt and the sandboxed retry. Per-item failures are logged and folded into
//! the aggregate result; they never abort sibling items.

mod copy;
mod create_dir;
mod delete;
mod helpers;
mod move_op;
mod rename;

pub(crate) use copy::Copier;
pub(crate) use create_dir::create_directory;
pub(crate) use delete::delete_entries;
pub(crate) use helpers::{delete_with_fallback, sorted_children, spawn_async_sync, stream};
pub(crate) use move_op::Mover;
pub(crate) use rename::rename_entry;
