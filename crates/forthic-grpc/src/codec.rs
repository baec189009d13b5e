//! Mapping between [`StackValue`] and the `forthic.v1` wire messages.
//!
//! The mapping is one-to-one and performs no semantic validation: dates,
//! nanos and zone names pass through untouched.

use forthic_proto::stack_value::Value as ProtoValue;
use forthic_proto::{
    ArrayValue, ErrorInfo as ProtoErrorInfo, ExecuteSequenceRequest, ExecuteSequenceResponse,
    ExecuteWordRequest, ExecuteWordResponse, NullValue, PlainDateValue, RecordValue,
    StackValue as ProtoStackValue, ZonedDateTimeValue,
};
use prost_types::Timestamp;

use crate::error::ErrorInfo;
use crate::value::{Instant, PlainDate, StackValue, ZonedDateTime};

/// Result of a call that completed at the transport level.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Stack(Vec<StackValue>),
    Error(ErrorInfo),
}

impl ExecutionOutcome {
    /// Result stack of a successful execution; empty when the word failed.
    pub fn result_stack(&self) -> &[StackValue] {
        match self {
            ExecutionOutcome::Stack(stack) => stack,
            ExecutionOutcome::Error(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ExecutionOutcome::Stack(_) => None,
            ExecutionOutcome::Error(info) => Some(info),
        }
    }

    pub fn into_result(self) -> Result<Vec<StackValue>, ErrorInfo> {
        match self {
            ExecutionOutcome::Stack(stack) => Ok(stack),
            ExecutionOutcome::Error(info) => Err(info),
        }
    }
}

impl From<Result<Vec<StackValue>, ErrorInfo>> for ExecutionOutcome {
    fn from(result: Result<Vec<StackValue>, ErrorInfo>) -> Self {
        match result {
            Ok(stack) => ExecutionOutcome::Stack(stack),
            Err(info) => ExecutionOutcome::Error(info),
        }
    }
}

pub fn encode_value(value: &StackValue) -> ProtoStackValue {
    let value = match value {
        StackValue::Null => ProtoValue::NullValue(NullValue {}),
        StackValue::Int(value) => ProtoValue::IntValue(*value),
        StackValue::String(value) => ProtoValue::StringValue(value.clone()),
        StackValue::Bool(value) => ProtoValue::BoolValue(*value),
        StackValue::Float(value) => ProtoValue::FloatValue(*value),
        StackValue::Array(items) => ProtoValue::ArrayValue(ArrayValue {
            items: encode_stack(items),
        }),
        StackValue::Record(fields) => ProtoValue::RecordValue(RecordValue {
            fields: fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect(),
        }),
        StackValue::Instant(instant) => ProtoValue::InstantValue(timestamp_from_instant(*instant)),
        StackValue::PlainDate(date) => ProtoValue::PlainDateValue(PlainDateValue {
            year: date.year,
            month: date.month,
            day: date.day,
        }),
        StackValue::ZonedDateTime(zoned) => ProtoValue::ZonedDatetimeValue(ZonedDateTimeValue {
            instant: Some(timestamp_from_instant(zoned.instant)),
            timezone: zoned.timezone.clone(),
        }),
    };
    ProtoStackValue { value: Some(value) }
}

/// Decode a wire value. A message with no field set decodes to `Null`.
pub fn decode_value(value: &ProtoStackValue) -> StackValue {
    match &value.value {
        None | Some(ProtoValue::NullValue(_)) => StackValue::Null,
        Some(ProtoValue::IntValue(value)) => StackValue::Int(*value),
        Some(ProtoValue::StringValue(value)) => StackValue::String(value.clone()),
        Some(ProtoValue::BoolValue(value)) => StackValue::Bool(*value),
        Some(ProtoValue::FloatValue(value)) => StackValue::Float(*value),
        Some(ProtoValue::ArrayValue(array)) => StackValue::Array(decode_stack(&array.items)),
        Some(ProtoValue::RecordValue(record)) => StackValue::Record(
            record
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect(),
        ),
        Some(ProtoValue::InstantValue(timestamp)) => {
            StackValue::Instant(instant_from_timestamp(timestamp))
        }
        Some(ProtoValue::PlainDateValue(date)) => {
            StackValue::PlainDate(PlainDate::new(date.year, date.month, date.day))
        }
        Some(ProtoValue::ZonedDatetimeValue(zoned)) => StackValue::ZonedDateTime(ZonedDateTime {
            instant: zoned
                .instant
                .as_ref()
                .map(instant_from_timestamp)
                .unwrap_or_default(),
            timezone: zoned.timezone.clone(),
        }),
    }
}

pub fn encode_stack(stack: &[StackValue]) -> Vec<ProtoStackValue> {
    stack.iter().map(encode_value).collect()
}

pub fn decode_stack(stack: &[ProtoStackValue]) -> Vec<StackValue> {
    stack.iter().map(decode_value).collect()
}

pub fn encode_error(info: &ErrorInfo) -> ProtoErrorInfo {
    ProtoErrorInfo {
        message: info.message.clone(),
        runtime: info.runtime.clone(),
        error_type: info.error_type.clone(),
    }
}

pub fn decode_error(info: &ProtoErrorInfo) -> ErrorInfo {
    ErrorInfo {
        message: info.message.clone(),
        runtime: info.runtime.clone(),
        error_type: info.error_type.clone(),
    }
}

pub fn word_request(word_name: &str, stack: &[StackValue]) -> ExecuteWordRequest {
    ExecuteWordRequest {
        word_name: word_name.to_string(),
        stack: encode_stack(stack),
    }
}

pub fn sequence_request<S: AsRef<str>>(
    word_names: &[S],
    stack: &[StackValue],
) -> ExecuteSequenceRequest {
    ExecuteSequenceRequest {
        word_names: word_names
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect(),
        stack: encode_stack(stack),
    }
}

/// Decode a word response. When `error` is set the result stack is ignored.
pub fn decode_word_response(response: &ExecuteWordResponse) -> ExecutionOutcome {
    decode_outcome(response.error.as_ref(), &response.result_stack)
}

pub fn decode_sequence_response(response: &ExecuteSequenceResponse) -> ExecutionOutcome {
    decode_outcome(response.error.as_ref(), &response.result_stack)
}

pub fn word_response(outcome: &ExecutionOutcome) -> ExecuteWordResponse {
    match outcome {
        ExecutionOutcome::Stack(stack) => ExecuteWordResponse {
            result_stack: encode_stack(stack),
            error: None,
        },
        ExecutionOutcome::Error(info) => ExecuteWordResponse {
            result_stack: Vec::new(),
            error: Some(encode_error(info)),
        },
    }
}

pub fn sequence_response(outcome: &ExecutionOutcome) -> ExecuteSequenceResponse {
    let ExecuteWordResponse {
        result_stack,
        error,
    } = word_response(outcome);
    ExecuteSequenceResponse {
        result_stack,
        error,
    }
}

fn decode_outcome(error: Option<&ProtoErrorInfo>, stack: &[ProtoStackValue]) -> ExecutionOutcome {
    match error {
        Some(info) => ExecutionOutcome::Error(decode_error(info)),
        None => ExecutionOutcome::Stack(decode_stack(stack)),
    }
}

fn timestamp_from_instant(instant: Instant) -> Timestamp {
    Timestamp {
        seconds: instant.seconds,
        nanos: instant.nanos,
    }
}

fn instant_from_timestamp(timestamp: &Timestamp) -> Instant {
    Instant::new(timestamp.seconds, timestamp.nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_values() -> Vec<StackValue> {
        vec![
            StackValue::Null,
            StackValue::Int(i64::MIN),
            StackValue::from("héllo"),
            StackValue::Bool(true),
            StackValue::Float(-0.25),
            StackValue::Array(Vec::new()),
            StackValue::Array(vec![
                StackValue::Int(1),
                StackValue::Array(vec![StackValue::from("nested"), StackValue::Null]),
                StackValue::Float(2.5),
            ]),
            StackValue::Record(BTreeMap::from([
                ("name".to_string(), StackValue::from("ada")),
                (
                    "tags".to_string(),
                    StackValue::Array(vec![StackValue::from("a"), StackValue::from("b")]),
                ),
            ])),
            StackValue::from(Instant::new(1_700_000_000, 123_456_789)),
            StackValue::from(PlainDate::new(2024, 2, 29)),
            StackValue::from(ZonedDateTime::new(
                Instant::new(1_700_000_000, 0),
                "America/Los_Angeles",
            )),
        ]
    }

    #[test]
    fn every_variant_survives_the_wire() {
        for value in sample_values() {
            let decoded = decode_value(&encode_value(&value));
            assert_eq!(decoded.value_type(), value.value_type());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn null_is_an_explicit_marker() {
        let encoded = encode_value(&StackValue::Null);
        assert!(matches!(encoded.value, Some(ProtoValue::NullValue(_))));
        assert_eq!(
            decode_value(&ProtoStackValue { value: None }),
            StackValue::Null
        );
    }

    #[test]
    fn temporal_variants_stay_distinct() {
        let instant = encode_value(&StackValue::from(Instant::new(5, 0)));
        let zoned = encode_value(&StackValue::from(ZonedDateTime::new(
            Instant::new(5, 0),
            "UTC",
        )));
        assert!(matches!(instant.value, Some(ProtoValue::InstantValue(_))));
        assert!(matches!(zoned.value, Some(ProtoValue::ZonedDatetimeValue(_))));
    }

    #[test]
    fn request_preserves_stack_order() {
        let stack = vec![StackValue::Int(2), StackValue::Int(3)];
        let request = word_request("add", &stack);
        assert_eq!(request.word_name, "add");
        assert_eq!(decode_stack(&request.stack), stack);

        let request = sequence_request(&["DUP", "*"][..], &stack);
        assert_eq!(request.word_names, vec!["DUP".to_string(), "*".to_string()]);
        assert_eq!(decode_stack(&request.stack), stack);
    }

    #[test]
    fn error_response_yields_empty_stack() {
        let response = ExecuteWordResponse {
            result_stack: encode_stack(&[StackValue::Int(9)]),
            error: Some(ProtoErrorInfo {
                message: "word not found".to_string(),
                runtime: "java".to_string(),
                error_type: "UnknownWord".to_string(),
            }),
        };
        let outcome = decode_word_response(&response);
        assert!(outcome.result_stack().is_empty());
        let error = outcome.error().expect("error info");
        assert_eq!(error.error_type, "UnknownWord");
        assert_eq!(error.runtime, "java");
    }

    #[test]
    fn stack_response_has_no_error() {
        let response = ExecuteSequenceResponse {
            result_stack: encode_stack(&[StackValue::Int(5)]),
            error: None,
        };
        let outcome = decode_sequence_response(&response);
        assert!(outcome.error().is_none());
        assert_eq!(outcome.result_stack(), &[StackValue::Int(5)]);
    }

    #[test]
    fn outcome_encodes_back_to_response() {
        let failed = ExecutionOutcome::Error(ErrorInfo::new("empty", "rust", "StackUnderflow"));
        let response = sequence_response(&failed);
        assert!(response.result_stack.is_empty());
        assert_eq!(decode_sequence_response(&response), failed);

        let ok = ExecutionOutcome::Stack(vec![StackValue::from("done")]);
        assert_eq!(decode_word_response(&word_response(&ok)), ok);
    }
}
