use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kw_ast::{Backend, KwConfig, Module};
use kw_desugar::{check_module, classify, desugar_module, DesugarError};
use swc_common::{errors::Handler, sync::Lrc, FileName, SourceMap, Span};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kw", about = "kwsugar: lower binds nested in control flow into keyword calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Desugar a JSON module and print the result.
    Desugar {
        /// Input module (.json).
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the desugared module as JSON instead of source text.
        #[arg(long)]
        json: bool,
        /// JSON config file; flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Use `map` for a final bind whose continuation is a plain value.
        #[arg(long)]
        fuse_map: bool,
        /// Emit `RECEIVER.keyword(..)` calls instead of keyword nodes.
        #[arg(long)]
        receiver: Option<String>,
        /// Prefix for generated bind names.
        #[arg(long)]
        fresh_prefix: Option<String>,
        /// Source file the spans point into, for diagnostics.
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Report every shape error in a JSON module.
    Check {
        input: PathBuf,
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Pretty-print a JSON module.
    Print {
        input: PathBuf,
        /// Show whether each definition body contains a bind.
        #[arg(long)]
        tags: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("KW_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Desugar {
            input,
            output,
            json,
            config,
            fuse_map,
            receiver,
            fresh_prefix,
            source,
        } => {
            let module = read_module(&input)?;
            let mut config = match &config {
                Some(path) => read_config(path)?,
                None => KwConfig::default(),
            };
            if fuse_map {
                config.fuse_map = true;
            }
            if let Some(receiver) = receiver {
                config.backend = Backend::Method { receiver };
            }
            if let Some(prefix) = fresh_prefix {
                config.fresh_prefix = prefix;
            }

            let desugared = match desugar_module(&module, &config) {
                Ok(desugared) => desugared,
                Err(err) => {
                    report(&[err], source.as_deref())?;
                    bail!("failed to desugar {}", input.display());
                }
            };

            let output_str = if json {
                let mut text = serde_json::to_string_pretty(&desugared)?;
                text.push('\n');
                text
            } else {
                desugared.to_string()
            };

            match &output {
                Some(path) => std::fs::write(path, &output_str)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{output_str}"),
            }
            info!(defs = desugared.defs.len(), "desugared {}", input.display());
        }
        Commands::Check { input, source } => {
            let module = read_module(&input)?;
            let errors = check_module(&module);
            if !errors.is_empty() {
                report(&errors, source.as_deref())?;
                bail!("{} error(s) in {}", errors.len(), input.display());
            }
            eprintln!("OK: {}", input.display());
        }
        Commands::Print { input, tags } => {
            let module = read_module(&input)?;
            for def in &module.defs {
                if tags {
                    println!("// {:?}", classify(&def.body));
                }
                println!("{def}");
            }
        }
    }

    Ok(())
}

fn read_module(path: &Path) -> Result<Module> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid module in {}", path.display()))
}

fn read_config(path: &Path) -> Result<KwConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config in {}", path.display()))
}

/// Render errors to stderr. Spans are byte offsets into `source`; without
/// it the messages are printed bare.
fn report(errors: &[DesugarError], source: Option<&Path>) -> Result<()> {
    let Some(path) = source else {
        for err in errors {
            eprintln!("error: {err}");
        }
        return Ok(());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let len = text.len();
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(
        Lrc::new(FileName::Custom(path.display().to_string())),
        text,
    );
    let handler = Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    for err in errors {
        let msg = err.to_string();
        let span = err.span();
        if !points_into(span, len) {
            handler.struct_err(&msg).emit();
        } else {
            let span = Span::new(file.start_pos + span.lo, file.start_pos + span.hi);
            handler.struct_span_err(span, &msg).emit();
        }
    }
    Ok(())
}

/// Whether `span` is a real range inside a source of `len` bytes.
fn points_into(span: Span, len: usize) -> bool {
    !span.is_dummy() && span.lo <= span.hi && span.hi.0 as usize <= len
}
