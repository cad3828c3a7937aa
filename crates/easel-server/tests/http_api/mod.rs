//! HTTP API tests

mod graphic_test;
mod health_test;
mod lock_test;
