//! End-to-end tests for the farm question pipeline live in `tests/`.
