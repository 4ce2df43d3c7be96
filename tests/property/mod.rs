//! Property-based tests for tree merging

mod tree_merge;
