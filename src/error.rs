use thiserror::Error;

/// Reasons the canvas could not be wired up at mount time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("canvas element not attached")]
    NoCanvas,
    #[error("2d context unavailable")]
    NoContext,
    #[error("failed to register {0} callback")]
    Listener(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            MountError::Listener("wheel").to_string(),
            "failed to register wheel callback"
        );
        assert_eq!(MountError::NoContext.to_string(), "2d context unavailable");
    }
}
