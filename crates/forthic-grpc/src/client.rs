//! Client for a remote Forthic runtime.
//!
//! Every call is an independent round trip. A call that does not complete
//! fails with [`ClientError`]; a call that completes returns an
//! [`ExecutionOutcome`], which may still carry an application error. The
//! client never retries: re-running a word is not assumed to be idempotent.

use forthic_proto::forthic_runtime_client::ForthicRuntimeClient;
use tokio::runtime::{Builder, Runtime};
use tonic::Request;
use tonic::transport::Channel;

use crate::codec::{self, ExecutionOutcome};
use crate::config::{ClientConfig, DEFAULT_GRPC_MAX_MESSAGE_BYTES};
use crate::error::ClientError;
use crate::value::StackValue;

/// Async client. Cloning is cheap and clones share the underlying channel.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    client: ForthicRuntimeClient<Channel>,
}

impl RuntimeClient {
    /// Open a channel without waiting for the connection to be established.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, ClientError> {
        let channel = config.endpoint()?.connect_lazy();
        Ok(Self::with_limits(channel, config.max_message_bytes))
    }

    pub fn new(channel: Channel) -> Self {
        Self::with_limits(channel, DEFAULT_GRPC_MAX_MESSAGE_BYTES)
    }

    fn with_limits(channel: Channel, max_message_bytes: usize) -> Self {
        Self {
            client: ForthicRuntimeClient::new(channel)
                .max_decoding_message_size(max_message_bytes)
                .max_encoding_message_size(max_message_bytes),
        }
    }

    pub async fn execute_word(
        &self,
        word_name: &str,
        stack: &[StackValue],
    ) -> Result<ExecutionOutcome, ClientError> {
        validate_word_name(word_name)?;
        let request = codec::word_request(word_name, stack);
        let response = self
            .client
            .clone()
            .execute_word(Request::new(request))
            .await?
            .into_inner();
        Ok(codec::decode_word_response(&response))
    }

    /// Run several words in one round trip, threading the stack through them.
    pub async fn execute_sequence<S: AsRef<str>>(
        &self,
        word_names: &[S],
        stack: &[StackValue],
    ) -> Result<ExecutionOutcome, ClientError> {
        validate_word_names(word_names)?;
        let request = codec::sequence_request(word_names, stack);
        let response = self
            .client
            .clone()
            .execute_sequence(Request::new(request))
            .await?
            .into_inner();
        Ok(codec::decode_sequence_response(&response))
    }
}

/// Synchronous client backed by a current-thread runtime.
///
/// Calls run on the caller's thread; no background threads are started.
/// Calling into this client from inside another tokio runtime panics.
#[derive(Debug)]
pub struct BlockingRuntimeClient {
    // Declared before `runtime` so the channel is dropped first.
    inner: RuntimeClient,
    runtime: Runtime,
}

impl BlockingRuntimeClient {
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = config.endpoint()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let inner = {
            let _guard = runtime.enter();
            RuntimeClient::with_limits(endpoint.connect_lazy(), config.max_message_bytes)
        };
        Ok(Self { inner, runtime })
    }

    pub fn execute_word(
        &self,
        word_name: &str,
        stack: &[StackValue],
    ) -> Result<ExecutionOutcome, ClientError> {
        self.runtime
            .block_on(self.inner.execute_word(word_name, stack))
    }

    pub fn execute_sequence<S: AsRef<str>>(
        &self,
        word_names: &[S],
        stack: &[StackValue],
    ) -> Result<ExecutionOutcome, ClientError> {
        self.runtime
            .block_on(self.inner.execute_sequence(word_names, stack))
    }
}

fn validate_word_name(word_name: &str) -> Result<(), ClientError> {
    if word_name.is_empty() {
        return Err(ClientError::invalid_argument("word name must not be empty"));
    }
    Ok(())
}

fn validate_word_names<S: AsRef<str>>(word_names: &[S]) -> Result<(), ClientError> {
    if word_names.is_empty() {
        return Err(ClientError::invalid_argument(
            "word sequence must not be empty",
        ));
    }
    for (index, name) in word_names.iter().enumerate() {
        if name.as_ref().is_empty() {
            return Err(ClientError::invalid_argument(format!(
                "word name at position {index} must not be empty"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrpcErrorCode;

    #[test]
    fn word_names_are_validated() {
        assert!(validate_word_name("DUP").is_ok());
        assert!(validate_word_name("").is_err());
        assert!(validate_word_names(&["DUP", "*"][..]).is_ok());
        assert!(validate_word_names::<&str>(&[]).is_err());
        let err = validate_word_names(&["DUP", ""][..]).expect_err("empty entry");
        assert_eq!(err.to_string(), "invalid argument: word name at position 1 must not be empty");
    }

    #[test]
    fn blocking_client_rejects_empty_address() {
        let err = BlockingRuntimeClient::connect_lazy(&ClientConfig::new(""))
            .expect_err("empty address");
        assert_eq!(err.code(), GrpcErrorCode::InvalidArgument);
    }

    #[test]
    fn invalid_word_name_fails_before_network() {
        // Nothing listens on this port; validation must fail first.
        let client = BlockingRuntimeClient::connect_lazy(&ClientConfig::new("127.0.0.1:1"))
            .expect("lazy client");
        let err = client.execute_word("", &[]).expect_err("empty word");
        assert_eq!(err.code(), GrpcErrorCode::InvalidArgument);
        let err = client
            .execute_sequence::<&str>(&[], &[StackValue::Int(1)])
            .expect_err("empty sequence");
        assert_eq!(err.code(), GrpcErrorCode::InvalidArgument);
    }
}
