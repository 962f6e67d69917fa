//! Integration tests driving the router against the in-memory store

mod api_tests;
