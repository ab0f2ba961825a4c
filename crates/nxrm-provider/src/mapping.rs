//! Translation of upstream results into diagnostics
//!
//! Every non-success either has a known recovery path (404 drops the resource
//! from state, 500 on delete is retried) or becomes an error.

use std::future::Future;
use std::time::Duration;

use nxrm_client::ClientError;
use nxrm_core::Diagnostic;

/// Total delete attempts when the server answers 500
pub const DELETE_ATTEMPTS: u32 = 3;

/// Pause between delete attempts
pub const DELETE_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Lifecycle step, used to word diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "creating",
            Operation::Read => "reading",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
            Operation::Import => "importing",
        }
    }

    fn infinitive(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        }
    }
}

/// What became of one upstream call
#[derive(Debug)]
pub enum Outcome<T> {
    Done(T),
    /// The entity does not exist upstream; drop it from state
    Gone(Diagnostic),
    Failed(Diagnostic),
}

/// Error diagnostic for a failed call, e.g. "Error creating File Blob Store"
pub fn api_error(op: Operation, noun: &str, err: &ClientError) -> Diagnostic {
    let detail = match err {
        ClientError::Api {
            status,
            status_text,
            message,
        } if message.is_empty() => format!("HTTP {} {}", status, status_text),
        ClientError::Api {
            status,
            status_text,
            message,
        } => format!("HTTP {} {}: {}", status, status_text, message),
        other => other.to_string(),
    };
    Diagnostic::error(format!("Error {} {}", op.verb(), noun), detail)
}

/// Warning for an entity that vanished outside the host runtime
pub fn drift_warning(op: Operation, noun: &str, id: &str) -> Diagnostic {
    Diagnostic::warning(
        format!("{} did not exist to {}", noun, op.infinitive()),
        format!(
            "{} '{}' was not found on the server and has been removed from state.",
            noun, id
        ),
    )
}

/// Classify a non-delete call
pub fn classify<T>(
    op: Operation,
    noun: &str,
    id: &str,
    result: Result<T, ClientError>,
) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Done(value),
        Err(e) if e.is_not_found() && matches!(op, Operation::Read | Operation::Update) => {
            tracing::warn!(noun, id, "{} vanished upstream", noun);
            Outcome::Gone(drift_warning(op, noun, id))
        }
        Err(e) if e.is_not_found() && op == Operation::Import => Outcome::Failed(Diagnostic::error(
            "Cannot import non-existent remote object",
            format!("{} '{}' does not exist on the server.", noun, id),
        )),
        Err(e) => Outcome::Failed(api_error(op, noun, &e)),
    }
}

/// Run a delete call, retrying while the server answers 500.
///
/// 404 is not an error: the entity is already gone.
pub async fn delete_with_retry<F, Fut>(noun: &str, id: &str, mut call: F) -> Outcome<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), ClientError>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(()) => return Outcome::Done(()),
            Err(e) if e.is_not_found() => {
                return Outcome::Gone(drift_warning(Operation::Delete, noun, id));
            }
            Err(e) if e.status() == Some(500) && attempt < DELETE_ATTEMPTS => {
                tracing::warn!(
                    noun,
                    id,
                    attempt,
                    "delete answered 500, retrying in {}s",
                    DELETE_RETRY_PAUSE.as_secs()
                );
                tokio::time::sleep(DELETE_RETRY_PAUSE).await;
                attempt += 1;
            }
            Err(e) => return Outcome::Failed(api_error(Operation::Delete, noun, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn api(status: u16, message: &str) -> ClientError {
        ClientError::Api {
            status,
            status_text: match status {
                404 => "Not Found",
                500 => "Internal Server Error",
                _ => "Bad Request",
            }
            .to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_api_error_wording() {
        let diag = api_error(Operation::Create, "File Blob Store", &api(400, "path must not be empty"));
        insta::assert_snapshot!(diag.to_string(), @r"
        Error: Error creating File Blob Store

        HTTP 400 Bad Request: path must not be empty
        ");
    }

    #[test]
    fn test_classify_404() {
        let read = classify::<()>(Operation::Read, "Role", "dev", Err(api(404, "")));
        assert!(matches!(read, Outcome::Gone(ref d) if !d.is_error()));

        let create = classify::<()>(Operation::Create, "Role", "dev", Err(api(404, "")));
        assert!(matches!(create, Outcome::Failed(ref d) if d.is_error()));

        let import = classify::<()>(Operation::Import, "Role", "dev", Err(api(404, "")));
        assert!(matches!(import, Outcome::Failed(ref d) if d.summary.contains("non-existent")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_gives_up_after_three_attempts() {
        let start = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let outcome = delete_with_retry("Role", "dev", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(api(500, "")) }
        })
        .await;
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), DELETE_ATTEMPTS);
        assert!(start.elapsed() >= DELETE_RETRY_PAUSE * (DELETE_ATTEMPTS - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_does_not_retry_other_errors() {
        let calls = AtomicU32::new(0);
        let outcome = delete_with_retry("Role", "dev", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(api(400, "in use")) }
        })
        .await;
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
