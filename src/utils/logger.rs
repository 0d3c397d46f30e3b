use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 未設定時使用的過濾規則；`level` 優先於 verbose
pub fn default_directive(verbose: bool, level: Option<&str>) -> String {
    match level {
        Some(level) => format!("signal_input_migrate={},info", level.trim().to_lowercase()),
        None if verbose => "signal_input_migrate=debug,info".to_string(),
        None => "signal_input_migrate=info".to_string(),
    }
}

fn env_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, level)))
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 供 CI 使用的 JSON 日誌，方便收集每個宣告的遷移決策
pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, None), "signal_input_migrate=info");
        assert_eq!(default_directive(true, None), "signal_input_migrate=debug,info");
        assert_eq!(
            default_directive(false, Some("Trace")),
            "signal_input_migrate=trace,info"
        );
        assert_eq!(
            default_directive(true, Some("warn")),
            "signal_input_migrate=warn,info"
        );
    }
}
