//! End-to-end tests for the Djoppie Inventory API over an in-memory SQLite
//! database.

mod integration;
