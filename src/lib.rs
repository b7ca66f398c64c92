//! Two-level AAC (augmentative and alternative communication) board.
//!
//! Home shows one pictogram per category; selecting one opens the category,
//! and selecting an item inside it yields the text to speak.

pub mod board;
pub mod cli;
pub mod config;
pub mod models;
pub mod storage;

pub use board::{Board, BoardEdit, LoadOptions, Selection, View};
pub use models::{BoardData, BoardError, Category, CategoryError, StorageError};
