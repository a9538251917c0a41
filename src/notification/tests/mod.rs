//! Unit tests for notification routing and provider backends.
