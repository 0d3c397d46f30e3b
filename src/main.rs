use clap::Parser;
use signal_input_migrate::core::ConfigProvider;
use signal_input_migrate::utils::error::ErrorSeverity;
use signal_input_migrate::utils::{logger, validation::Validate};
use signal_input_migrate::{CliConfig, LocalStorage, MigrationEngine, MigrationReport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose, None);
    } else {
        logger::init_cli_logger(config.verbose, None);
    }

    tracing::info!("Starting signal-input-migrate CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 Phase monitoring enabled");
    }

    let sources = LocalStorage::new(config.project_root().to_string());
    let output = LocalStorage::new(config.output_path().to_string());
    let output_path = config.output_path().to_string();
    let engine = MigrationEngine::new_with_monitoring(sources, output, config, monitor_enabled);

    match engine.run().await {
        Ok(report) => print_summary(&report, &output_path),
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Migration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn print_summary(report: &MigrationReport, output_path: &str) {
    tracing::info!("✅ Migration completed successfully!");
    println!(
        "✅ Migrated {} inputs, skipped {} ({} files changed)",
        report.stats.migrated,
        report.stats.skipped,
        report.files_changed.len()
    );
    for (reason, count) in &report.stats.skipped_by_reason {
        println!("   - {}: {}", reason, count);
    }
    if !report.partially_migrated.is_empty() {
        println!(
            "⚠️  {} files still import the legacy decorator",
            report.partially_migrated.len()
        );
    }
    if report.dry_run {
        println!("🔍 Dry run: nothing was written");
    } else {
        println!("📁 Output saved to: {}", output_path);
    }
}
