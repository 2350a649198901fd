//! # class-leak
//!
//! Finds PHP classes that have neither a parent class nor an interface but are
//! still consumed from the outside through serialization, ORM mapping or
//! attributes.
//!
//! ## Architecture
//!
//! - **scan**: Source file discovery and reading
//! - **structure**: Class, trait and enum header extraction using tree-sitter AST parsing
//! - **classify**: Text marker rules for serialization and entity signals
//! - **class**: The `FileWithClass` entity and its report record
//! - **report**: Leak predicate, filters, ordering and summary
//! - **engine**: Parallel per-file pipeline with cooperative cancellation
//! - **path**: Working-directory relative path display

pub mod class;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod path;
pub mod report;
pub mod scan;
pub mod structure;
