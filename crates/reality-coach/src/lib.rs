//! Core library for the Career Reality Coach: an adaptive, weighted yes/no
//! questionnaire that estimates how well a person's personality, expectations,
//! and constraints match a target occupation.
//!
//! The decision engine lives under [`workflows::coaching`]; configuration,
//! telemetry, and the top-level error type support the service binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
