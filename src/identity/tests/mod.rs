//! Unit tests for identity resolution.
