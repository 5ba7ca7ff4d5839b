//! Property-based tests for bucketing and merging

mod determinism;
