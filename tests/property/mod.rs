//! Property-based tests for tree and history invariants

mod history_invariants;
mod tree_invariants;
