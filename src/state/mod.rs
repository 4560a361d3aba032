/// State management module
///
/// This module handles all application state, including:
/// - The SQLite record store of saved edits (records.rs)
/// - Shared data structures (data.rs)
/// - Filters and the transient editing session (edit.rs)

pub mod data;
pub mod edit;
pub mod records;
