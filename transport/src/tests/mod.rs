//! Unit tests for transport implementations

mod mock_tests;
