//! gRPC service adapter for a Forthic interpreter.
//!
//! The interpreter itself is supplied by the embedder through
//! [`WordExecutor`]; this module only translates between the wire and the
//! executor.

use forthic_proto::forthic_runtime_server::{ForthicRuntime, ForthicRuntimeServer};
use forthic_proto::{
    ExecuteSequenceRequest, ExecuteSequenceResponse, ExecuteWordRequest, ExecuteWordResponse,
};
use tonic::{Request, Response, Status};

use crate::codec::{self, ExecutionOutcome};
use crate::config::DEFAULT_GRPC_MAX_MESSAGE_BYTES;
use crate::error::ErrorInfo;
use crate::value::StackValue;

/// Executes words against a stack.
pub trait WordExecutor: Send + Sync + 'static {
    fn execute_word(
        &self,
        word_name: &str,
        stack: Vec<StackValue>,
    ) -> Result<Vec<StackValue>, ErrorInfo>;

    /// Runs each word in order on the stack left by the previous one and
    /// stops at the first failure.
    fn execute_sequence(
        &self,
        word_names: &[String],
        stack: Vec<StackValue>,
    ) -> Result<Vec<StackValue>, ErrorInfo> {
        word_names
            .iter()
            .try_fold(stack, |stack, word_name| self.execute_word(word_name, stack))
    }
}

/// The `ForthicRuntime` service backed by a [`WordExecutor`].
pub struct RuntimeService<E> {
    executor: E,
}

impl<E: WordExecutor> RuntimeService<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Wrap into a tonic server with the default message size limits.
    pub fn into_server(self) -> ForthicRuntimeServer<Self> {
        self.into_server_with_limit(DEFAULT_GRPC_MAX_MESSAGE_BYTES)
    }

    /// Wrap into a tonic server that caps messages at `max_message_bytes` in
    /// both directions.
    pub fn into_server_with_limit(self, max_message_bytes: usize) -> ForthicRuntimeServer<Self> {
        ForthicRuntimeServer::new(self)
            .max_decoding_message_size(max_message_bytes)
            .max_encoding_message_size(max_message_bytes)
    }
}

#[tonic::async_trait]
impl<E: WordExecutor> ForthicRuntime for RuntimeService<E> {
    async fn execute_word(
        &self,
        request: Request<ExecuteWordRequest>,
    ) -> Result<Response<ExecuteWordResponse>, Status> {
        let request = request.into_inner();
        if request.word_name.is_empty() {
            return Err(Status::invalid_argument("word_name is required"));
        }
        let stack = codec::decode_stack(&request.stack);
        let outcome = ExecutionOutcome::from(self.executor.execute_word(&request.word_name, stack));
        Ok(Response::new(codec::word_response(&outcome)))
    }

    async fn execute_sequence(
        &self,
        request: Request<ExecuteSequenceRequest>,
    ) -> Result<Response<ExecuteSequenceResponse>, Status> {
        let request = request.into_inner();
        if request.word_names.is_empty() {
            return Err(Status::invalid_argument("word_names is required"));
        }
        if request.word_names.iter().any(String::is_empty) {
            return Err(Status::invalid_argument("word_names must not contain empty names"));
        }
        let stack = codec::decode_stack(&request.stack);
        let outcome = ExecutionOutcome::from(
            self.executor
                .execute_sequence(&request.word_names, stack),
        );
        Ok(Response::new(codec::sequence_response(&outcome)))
    }
}
