//! Testing utilities for harnesses that record API documentation.
//!
//! This module provides:
//! - Exchange builders and a recorder fixture that collects events
//! - Assertions on emitted documents and recorder errors

mod assertions;
mod fixtures;

pub use assertions::{
    assert_documented, assert_example_count, assert_field_documented, assert_missing_field,
    assert_missing_link, assert_missing_parameter,
};
pub use fixtures::{TestExchange, TestRun};
