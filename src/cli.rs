use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::core::{Context, Engine};
use crate::report;

#[derive(Parser)]
#[command(name = "twlint")]
#[command(about = "Find invalid Tailwind CSS classes in your templates")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub check: CheckArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every mode
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOptions {
    /// CSS configuration entry point (e.g. src/app.css)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Print the machine-readable report
    #[arg(long)]
    pub json: bool,

    /// Stop treating a context as a class-list source (repeatable)
    #[arg(long, value_enum, value_name = "CONTEXT")]
    pub disable_context: Vec<Context>,

    /// Treat an opt-in context as a class-list source (repeatable)
    #[arg(long, value_enum, value_name = "CONTEXT")]
    pub enable_context: Vec<Context>,

    /// Maximum number of files read at once
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,
}

/// Check mode, the default command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub options: ScanOptions,

    /// Validate every raw candidate instead of only class-list tokens
    #[arg(long)]
    pub no_filter: bool,

    /// Files, directories or globs to scan; prefix with ! to exclude
    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count where a class is used
    CountClasses {
        /// The class to look for
        #[arg(long = "class", value_name = "NAME")]
        class_name: String,

        #[command(flatten)]
        options: ScanOptions,

        /// Files, directories or globs to scan; prefix with ! to exclude
        #[arg(required = true)]
        files: Vec<String>,
    },
}

impl Cli {
    fn options(&self) -> &ScanOptions {
        match &self.command {
            Some(Commands::CountClasses { options, .. }) => options,
            None => &self.check.options,
        }
    }

    /// Fold command line flags over the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        let options = self.options();

        if let Some(path) = &options.path {
            config.css = Some(path.clone());
        }
        if let Some(concurrency) = options.concurrency {
            config.scan.concurrency = concurrency.get();
        }
        for context in &options.disable_context {
            config.contexts.set(*context, false);
        }
        for context in &options.enable_context {
            config.contexts.set(*context, true);
        }
        if self.command.is_none() && self.check.no_filter {
            config.scan.context_aware = false;
        }
    }

    pub async fn execute(self, engine: Engine) -> Result<ExitCode> {
        match self.command {
            Some(Commands::CountClasses { class_name, options, files }) => {
                let outcome = engine.count(engine.count_request(files, class_name)).await?;
                if options.json {
                    println!("{}", report::count_json(&outcome)?);
                } else {
                    print!("{}", report::count_human(&outcome));
                }
                Ok(ExitCode::SUCCESS)
            }
            None => {
                let outcome = engine.scan(engine.scan_request(self.check.files)).await?;
                if self.check.options.json {
                    println!("{}", report::check_json(&outcome)?);
                } else {
                    print!("{}", report::check_human(&outcome));
                }
                Ok(if outcome.has_invalid() { ExitCode::from(1) } else { ExitCode::SUCCESS })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_mode_flags() {
        let cli = Cli::try_parse_from([
            "twlint",
            "--path",
            "app.css",
            "--no-filter",
            "--disable-context",
            "svelte",
            "--enable-context",
            "css-selectors",
            "--concurrency",
            "4",
            "src/**/*.tsx",
            "!src/gen/**",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.check.files, vec!["src/**/*.tsx", "!src/gen/**"]);

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.css, Some(PathBuf::from("app.css")));
        assert_eq!(config.scan.concurrency, 4);
        assert!(!config.scan.context_aware);
        assert!(!config.contexts.svelte);
        assert!(config.contexts.css_selectors);
    }

    #[test]
    fn test_count_classes_subcommand() {
        let cli = Cli::try_parse_from(["twlint", "count-classes", "--class", "p-4", "--path", "app.css", "--json", "src"]).unwrap();
        match &cli.command {
            Some(Commands::CountClasses { class_name, options, files }) => {
                assert_eq!(class_name, "p-4");
                assert!(options.json);
                assert_eq!(files, &vec!["src".to_string()]);
            }
            None => panic!("expected count-classes"),
        }

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.css, Some(PathBuf::from("app.css")));
        assert!(config.scan.context_aware);
    }

    #[test]
    fn test_rejected_arguments() {
        assert!(Cli::try_parse_from(["twlint", "--path", "app.css"]).is_err());
        assert!(Cli::try_parse_from(["twlint", "--concurrency", "0", "src"]).is_err());
        assert!(Cli::try_parse_from(["twlint", "--disable-context", "php", "src"]).is_err());
        assert!(Cli::try_parse_from(["twlint", "count-classes", "src"]).is_err());
    }
}
