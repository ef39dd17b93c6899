use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

use security_resolver::security::baseline::StaticBaseline;
use security_resolver::security::compiler::SecurityCompiler;
use security_resolver::security::pattern::GlobPatternConverter;
use security_resolver::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "security-resolver",
    version,
    about = "Resolve a Nexus 2 security.xml into a flattened permission model"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Nexus work directory (overrides source.path from the config file)
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    tracing::debug!(?settings, "Loaded configuration");

    let instance = cli
        .path
        .or_else(|| settings.source.path.clone())
        .ok_or_else(|| miette::miette!("No Nexus instance given; pass a path or set source.path"))?;

    let converter = GlobPatternConverter::new(settings.patterns.max_patterns);
    let baseline = StaticBaseline::new(&settings.baseline, &converter);
    let compiler = SecurityCompiler::new(baseline, converter);

    compiler.refresh(&instance, HashMap::new(), &settings.repositories)?;

    let model = compiler
        .model()
        .ok_or_else(|| miette::miette!("Security model missing after refresh"))?;
    let summary = serde_json::to_string_pretty(&model.summary()).into_diagnostic()?;
    println!("{summary}");
    Ok(())
}
