//! Integration test suite for artdeps
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **descriptor_files**: Loading, saving and formatting descriptor files on disk
//! - **pipeline**: Parse, resolve and expand end to end against in-memory and snapshot servers
//! - **cli**: The `artdeps` binary driven through `assert_cmd`

mod cli;
mod descriptor_files;
mod pipeline;
