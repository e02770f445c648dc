//! Integration tests exercising the full wiring: admission pipeline,
//! document lifecycle through the cached service layer, and the
//! cross-service deletion saga.

mod helpers;

mod admission_test;
mod lifecycle_test;
mod saga_test;
