//! Unit tests for the command surface.
