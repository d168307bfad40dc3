//! End-to-end harness scenarios.
//!
//! Full deploy → transfer → query → assert runs against a scripted
//! transport, covering the verdicts a batch can produce.
