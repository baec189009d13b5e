//! Forthic runtime Protocol Buffer generated code.
//!
//! This crate contains the generated Rust code for the `forthic.v1` gRPC
//! protocol: the `StackValue` wire message, the word execution requests and
//! responses, and the `ForthicRuntime` client and server stubs.

pub mod forthic {
    pub mod v1 {
        tonic::include_proto!("forthic.v1");
    }
}

// Re-export commonly used types at the crate root for convenience
pub use forthic::v1::*;
