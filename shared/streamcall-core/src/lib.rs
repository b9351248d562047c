//! Streamcall Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Call domain types (CallSession, CallType, CallStatus, JoinCredentials)
//! - Platform error type with stable codes
//! - Environment configuration
//! - The service trait and runtime the binaries run under

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{env_or, parse_env, ServiceConfig};
pub use domain::*;
pub use error::{Result, StreamcallError};
pub use service::{DependencyStatus, HealthStatus, ReadinessStatus, ServiceRuntime, StreamcallService};
