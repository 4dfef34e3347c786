//! Response: what a dispatched command hands back to the caller.


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Text for stdout; may be empty.
    Ok { output: String },
    /// Text for stderr; the process exits nonzero.
    Error { message: String },
}

impl Response {
    pub fn ok(output: impl Into<String>) -> Self {
        Response::Ok {
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for Response {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(output) => Response::ok(output),
            Err(e) => Response::error(e.to_string()),
        }
    }
}
