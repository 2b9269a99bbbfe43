//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::RequestError;
use crate::APP_NAME;

/// Application errors wrap domain errors and add resolution and dispatch context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Request(#[from] RequestError),

    #[error("{}", parse_message(.token, .message))]
    Parse { token: String, message: String },

    #[error("{}", no_action_message(.face, .action))]
    NoAction {
        face: String,
        action: Option<String>,
    },

    #[error(
        "{} {face} {action} takes {wanted} argument{}, but you gave {given}",
        APP_NAME,
        plural(.wanted)
    )]
    Arity {
        face: String,
        action: String,
        given: usize,
        wanted: usize,
    },

    #[error("{0}")]
    Render(String),

    #[error("unknown face '{}'. See `{} help` for the list of faces", .0, APP_NAME)]
    UnknownFace(String),

    #[error("config error: {message}")]
    Config { message: String },

    /// Failure raised by an action handler
    #[error("{0}")]
    Action(anyhow::Error),
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

fn parse_message(token: &str, message: &str) -> String {
    if token.is_empty() {
        message.to_string()
    } else {
        format!("{message}: {token}")
    }
}

fn no_action_message(face: &str, action: &Option<String>) -> String {
    match action {
        Some(action) => format!("'{face}' has no '{action}' action. See `{APP_NAME} help {face}`"),
        None => format!("'{face}' has no default action. See `{APP_NAME} help {face}`"),
    }
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_arity_error_when_displayed_then_names_counts() {
        let err = ApplicationError::Arity {
            face: "request".into(),
            action: "describe".into(),
            given: 1,
            wanted: 2,
        };
        assert_eq!(
            err.to_string(),
            "facecli request describe takes 2 arguments, but you gave 1"
        );
    }

    #[test]
    fn given_no_action_error_when_displayed_then_names_face_and_action() {
        let err = ApplicationError::NoAction {
            face: "request".into(),
            action: Some("frob".into()),
        };
        assert!(err.to_string().starts_with("'request' has no 'frob' action"));

        let err = ApplicationError::NoAction {
            face: "request".into(),
            action: None,
        };
        assert!(err.to_string().starts_with("'request' has no default action"));
    }

    #[test]
    fn given_parse_error_when_displayed_then_names_token() {
        let err = ApplicationError::Parse {
            token: "--bogus".into(),
            message: "unrecognized option".into(),
        };
        assert_eq!(err.to_string(), "unrecognized option: --bogus");
    }
}
