//! Clients of the platform's JSON web API

mod playurl;
mod view;

pub use playurl::{resolve_streams, Resolved};
pub use view::get_metadata;

use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{Error, Result};

pub const API_URL: &str = "https://api.bilibili.com";

/// The `{code, message, data}` wrapper every endpoint answers with
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Parse an endpoint answer and extract its `data` payload.
///
/// A non-zero `code` is turned into an error by `on_code`, which receives
/// the code and the endpoint's message.
fn parse_data<T, F>(endpoint: &'static str, body: &str, on_code: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce(i64, String) -> Error,
{
    let parse_error = |reason: String| Error::ResponseParse { endpoint, reason };

    let envelope: Envelope =
        serde_json::from_str(body).map_err(|err| parse_error(err.to_string()))?;

    if envelope.code != 0 {
        return Err(on_code(envelope.code, envelope.message));
    }

    let data = envelope
        .data
        .ok_or_else(|| parse_error("missing 'data' object".to_owned()))?;

    serde_json::from_value(data).map_err(|err| parse_error(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, Deserialize)]
    struct Answer {
        value: u32,
    }

    fn unknown(code: i64, message: String) -> Error {
        Error::Unknown {
            code: Some(code),
            message,
        }
    }

    #[test]
    fn extracts_data_on_zero_code() {
        let answer: Answer =
            parse_data("test", r#"{"code":0,"message":"0","data":{"value":7}}"#, unknown).unwrap();
        assert_eq!(answer.value, 7);
    }

    #[test]
    fn non_zero_code_goes_through_the_mapper() {
        let err = parse_data::<Answer, _>("test", r#"{"code":-400,"message":"bad"}"#, unknown)
            .unwrap_err();
        match err {
            Error::Unknown { code, message } => {
                assert_eq!(code, Some(-400));
                assert_eq!(message, "bad");
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn malformed_bodies_are_parse_errors() {
        for body in [
            "<html>blocked</html>",
            r#"{"message":"no code"}"#,
            r#"{"code":0}"#,
            r#"{"code":0,"data":null}"#,
            r#"{"code":0,"data":{"value":"seven"}}"#,
        ] {
            let err = parse_data::<Answer, _>("test", body, unknown).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResponseParse, "{body}");
        }
    }
}
