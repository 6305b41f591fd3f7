//! Unit tests for promise_bridge

mod helpers_test;
