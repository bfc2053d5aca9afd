use std::future::Future;

use colloquy_agent::AgentError;

/// Runs `task` on its own tokio task.
///
/// A panic inside the task comes back as [`AgentError::Interrupted`], so the
/// caller always gets a result to fold into session state.
pub async fn detached<T, F>(task: F) -> Result<T, AgentError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, AgentError>> + Send + 'static,
{
    match tokio::spawn(task).await {
        Ok(result) => result,
        Err(e) => Err(AgentError::Interrupted(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_result_passes_through() {
        let value = detached(async { Ok::<_, AgentError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_panic_becomes_interrupted() {
        let result: Result<(), AgentError> = detached(async { panic!("boom") }).await;
        assert!(matches!(result, Err(AgentError::Interrupted(_))));
    }
}
