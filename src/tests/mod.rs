//! Integration-style tests for the binary crate.
