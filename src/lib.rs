//! Assessment Engine - questionnaire sessions that survive interruption
//!
//! A user walks through the ordered questions of a sub-domain, answering
//! each as compliant, non-compliant or not applicable. Progress can be saved
//! and resumed later; finishing produces an immutable report with
//! compliance counts and an AI-generated summary that is deferred while
//! offline and retried when connectivity returns.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
