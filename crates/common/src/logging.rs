use std::fmt::Display;

pub trait LogError {
    fn log_error_msg(&self, msg: &str) -> &Self;
    fn log_error_msg_with<M, F>(&self, f: F) -> &Self
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E> LogError for Result<T, E>
where
    E: Display,
{
    fn log_error_msg(&self, msg: &str) -> &Self {
        if let Err(e) = self {
            log::error!("{msg}: {e}")
        }
        self
    }
    fn log_error_msg_with<M, F>(&self, f: F) -> &Self
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        self.log_error_msg(&f().into());
        self
    }
}

/// Result of a best-effort operation (deleting a stale message, revoking an
/// old link). Failure is logged as a warning and never surfaced to the caller.
pub trait Cleanup {
    /// Returns `true` if the operation succeeded
    fn cleanup(self, what: &str) -> bool;
}

impl<T, E> Cleanup for Result<T, E>
where
    E: Display,
{
    fn cleanup(self, what: &str) -> bool {
        match self {
            Ok(_) => true,
            Err(e) => {
                log::warn!("{what} failed, ignoring: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_reports_outcome() {
        let ok: Result<(), String> = Ok(());
        let err: Result<(), String> = Err("gone".to_string());

        assert!(ok.cleanup("delete message"));
        assert!(!err.cleanup("delete message"));
    }
}
