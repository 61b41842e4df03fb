//! Unit tests for the verification client and callback adapter
