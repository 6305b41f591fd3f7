//! Unit tests for the memory_manager component

mod heap_test;
