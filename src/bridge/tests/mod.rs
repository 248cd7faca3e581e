//! Unit tests for the bridge area.

mod domain_tests;
mod support;
