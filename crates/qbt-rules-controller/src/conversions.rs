//! Conversions from WebUI responses to qbt-rules types.

use serde::de::DeserializeOwned;

use qbt_rules_types::{ClientError, Degraded};

use crate::ops::ApiResponse;

/// Maps transport errors to client errors.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

/// Accepts a 200 response, anything else becomes an error attributed to `call`.
pub(crate) fn check_status(
    call: &'static str,
    response: ApiResponse,
) -> Result<ApiResponse, ClientError> {
    match response.status {
        200 => Ok(response),
        403 => Err(ClientError::Unauthorized),
        status => Err(ClientError::ServerError {
            call,
            status,
            body: response.body,
        }),
    }
}

/// Decodes the JSON body of a successful response.
pub(crate) fn decode_json<D: DeserializeOwned>(
    call: &'static str,
    response: ApiResponse,
) -> Result<D, ClientError> {
    let response = check_status(call, response)?;
    serde_json::from_str(&response.body).map_err(|e| ClientError::Decode {
        call,
        message: e.to_string(),
    })
}

/// Reduces a best-effort call's response to its outcome.
pub(crate) fn degrade(
    call: &'static str,
    response: Result<ApiResponse, ClientError>,
) -> Result<(), Degraded> {
    response
        .and_then(|response| check_status(call, response))
        .map(|_| ())
        .map_err(|e| Degraded::new(call, e))
}

/// Renders a flag the way the WebUI expects form booleans.
pub(crate) fn form_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
