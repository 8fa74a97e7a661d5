//! Clients for external services

pub mod grading;

pub use grading::{
    build_strategies, run_strategies, AttemptOutcome, AuthStrategy, Credentials,
    GradingServiceClient, RemoteEndpoint, RemoteEvaluator, RemoteOutcome, UnavailableReason,
};
