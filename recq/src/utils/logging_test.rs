#[cfg(test)]
mod tests {
    use super::super::logging::{init_logging, DEFAULT_FILTER};

    #[test]
    fn test_logging_initialization() {
        // 重复初始化不应 panic
        init_logging();
        init_logging();

        tracing::debug!(filter = DEFAULT_FILTER, "logging ready");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
