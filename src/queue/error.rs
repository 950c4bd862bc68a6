use thiserror::Error;

/// Errors from the queue gateway client.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The gateway answered with a non-success HTTP status.
    #[error("queue gateway returned status {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Underlying network failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_display() {
        let err = QueueError::Gateway {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "queue gateway returned status 502: bad gateway"
        );
    }
}
