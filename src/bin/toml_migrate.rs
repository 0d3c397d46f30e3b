use clap::Parser;
use signal_input_migrate::config::toml_config::TomlConfig;
use signal_input_migrate::core::ConfigProvider;
use signal_input_migrate::utils::error::ErrorSeverity;
use signal_input_migrate::utils::{logger, validation::Validate};
use signal_input_migrate::{LocalStorage, MigrationEngine};

#[derive(Parser)]
#[command(name = "toml-migrate")]
#[command(about = "Signal input migration driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "signal-migrate.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override insert_todos_for_skipped_fields from config
    #[arg(long)]
    insert_todos: Option<bool>,

    /// Compute edits without writing any file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }
    tracing::info!("🚀 Starting TOML-based signal input migration");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(insert_todos) = args.insert_todos {
        config.migration.insert_todos_for_skipped_fields = insert_todos;
        tracing::info!("🔧 insert_todos_for_skipped_fields overridden to: {}", insert_todos);
    }
    if args.dry_run {
        config.output.dry_run = Some(true);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let sources = LocalStorage::new(config.project_root().to_string());
    let output = LocalStorage::new(config.output_path().to_string());
    let engine = MigrationEngine::new_with_monitoring(sources, output, config, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Migration completed successfully!");
            println!(
                "✅ Migrated {} inputs, skipped {}, removed the legacy import from {} files",
                report.stats.migrated,
                report.stats.skipped,
                report.imports_removed.len()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Migration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
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

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Project root: {}", config.project_root());
    tracing::info!("   Plan: {}", config.plan_path());
    tracing::info!("   Output: {}", config.output_path());
    tracing::info!(
        "   Rewrite: {} -> {} ({})",
        config.legacy_symbol(),
        config.signal_symbol(),
        config.core_module()
    );
    tracing::info!(
        "   TODOs for skipped inputs: {}",
        config.insert_todos_for_skipped_fields()
    );
    if config.dry_run() {
        tracing::info!("   🔍 Dry run");
    }
}
