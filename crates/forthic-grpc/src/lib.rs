//! Forthic remote runtime client.
//!
//! This crate provides:
//! - The stack value model exchanged with a remote Forthic runtime
//! - The codec between stack values and the `forthic.v1` wire messages
//! - Async and blocking gRPC clients with separate transport and
//!   application error channels
//! - A gRPC service adapter for embedding an interpreter
//! - A C ABI with explicit ownership rules (`include/forthic_grpc.h`)

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod ffi;
pub mod server;
pub mod value;

pub use client::{BlockingRuntimeClient, RuntimeClient};
pub use codec::ExecutionOutcome;
pub use config::{ChannelCredentials, ClientConfig, DEFAULT_GRPC_MAX_MESSAGE_BYTES};
pub use error::{ClientError, ErrorInfo, GrpcErrorCode};
pub use server::{RuntimeService, WordExecutor};
pub use value::{Instant, PlainDate, StackValue, StackValueType, ZonedDateTime};
