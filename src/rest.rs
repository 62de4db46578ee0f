//! Request parsing: method + request target + body -> one tagged variant.
//!
//! This is the validation phase. It runs before any store access and either
//! produces a [`RestRequest`] or short-circuits with a [`BadRequest`].
//!
//! Matching is done against the full origin-form request target, so a query
//! string makes an otherwise valid path a bad request (`/employee/7?x=1` is
//! rejected). That matches the original service this one replaces.

use crate::employee::{coerce_int, EmployeeId, Payload};
use hyper::Method;
use serde_json::Value;
use std::fmt;

pub const MSG_BAD_REQUEST: &str = "Bad REST request.";
pub const MSG_UNSUPPORTED: &str = "Unsupported REST request.";
pub const MSG_INSERT_EXISTS: &str = "Unable to insert because the employee already exists.";
pub const MSG_UPDATE_MISSING: &str = "Unable to update because the employee does not exist.";
pub const MSG_DELETE_MISSING: &str = "Unable to delete because the employee does not exist.";

/// Terminal request failure: always HTTP 400 with the message as the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadRequest(pub &'static str);

impl fmt::Display for BadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for BadRequest {}

/// A validated REST request, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RestRequest {
    /// `GET /` health probe. Answered without touching the store.
    Health,
    /// `GET /employee/{id}`
    Read(EmployeeId),
    /// `POST /employee` with a payload carrying a non-zero `employeeId`.
    Create(EmployeeId, Payload),
    /// `PUT /employee/{id}`
    Update(EmployeeId, Payload),
    /// `DELETE /employee/{id}`
    Delete(EmployeeId),
}

/// Parse and validate one request.
///
/// `target` is the origin-form request target (path plus any query string);
/// `body` is the raw request body, only consulted for POST and PUT.
pub fn parse(method: &Method, target: &str, body: &[u8]) -> Result<RestRequest, BadRequest> {
    match *method {
        Method::GET => {
            if target.is_empty() || target == "/" {
                return Ok(RestRequest::Health);
            }
            Ok(RestRequest::Read(parse_employee_path(target)?))
        }
        Method::PUT => {
            let id = parse_employee_path(target)?;
            Ok(RestRequest::Update(id, parse_payload(body)))
        }
        Method::DELETE => Ok(RestRequest::Delete(parse_employee_path(target)?)),
        Method::POST => {
            if target != "/employee" {
                return Err(BadRequest(MSG_BAD_REQUEST));
            }
            let payload = parse_payload(body);
            let id = payload.get("employeeId").map_or(0, coerce_int);
            if id == 0 {
                return Err(BadRequest(MSG_UNSUPPORTED));
            }
            Ok(RestRequest::Create(id, payload))
        }
        _ => Err(BadRequest(MSG_UNSUPPORTED)),
    }
}

/// Match `^/employee/(\d+)$` and return the captured id.
fn parse_employee_path(target: &str) -> Result<EmployeeId, BadRequest> {
    let id = target
        .strip_prefix("/employee/")
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<EmployeeId>().ok())
        .ok_or(BadRequest(MSG_BAD_REQUEST))?;
    Ok(id)
}

/// Decode a JSON body into a payload map. Anything that is not a JSON
/// object (including an unparsable body) becomes an empty map.
fn parse_payload(body: &[u8]) -> Payload {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Payload::new(),
    }
}
