use clap::{Parser, Subcommand};
use report_core::{
    resolve_output_dir, CoreConfig, ExportRequest, Exporter, ReportResult, SectionKind,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "report")]
#[command(about = "Clinical letter and risk summary export")]
struct Cli {
    /// Directory exported artefacts are written into
    #[arg(long, global = true, env = "REPORT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a word-processing letter from an export request
    Document {
        /// Export request file (.json, .yaml or .yml)
        input: PathBuf,
        /// Output file name
        #[arg(long, default_value = "letter.docx")]
        out: String,
    },
    /// Build the plain-text risk narrative from an export request
    Narrative {
        /// Export request file (.json, .yaml or .yml)
        input: PathBuf,
        /// Output file name
        #[arg(long, default_value = "risk_summary.txt")]
        out: String,
        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// List letter sections in rendering order
    Sections,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report=info,report_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Document { input, out }) => {
            let exporter = exporter(cli.output_dir)?;
            let request = ExportRequest::from_path(&input)?;
            let bytes = exporter.document(&request.sections, &request.signature)?;
            let path = write_artefact(&exporter, &out, &bytes, "letter")?;
            println!("Wrote letter to {}", path.display());
        }
        Some(Commands::Narrative { input, out, stdout }) => {
            let exporter = exporter(cli.output_dir)?;
            let request = ExportRequest::from_path(&input)?;
            let text = exporter.narrative(&request.narrative)?;
            if stdout {
                print!("{text}");
            } else {
                let path = write_artefact(&exporter, &out, text.as_bytes(), "risk summary")?;
                println!("Wrote risk summary to {}", path.display());
            }
        }
        Some(Commands::Sections) => {
            for kind in SectionKind::all() {
                println!("{:>2}  {:<34} {}", kind.order(), kind.key(), kind.title());
            }
        }
        None => {
            println!("Use 'report --help' for commands");
        }
    }

    Ok(())
}

fn exporter(output_dir: Option<PathBuf>) -> Result<Exporter, Box<dyn std::error::Error>> {
    let dir = resolve_output_dir(output_dir)?;
    Ok(Exporter::new(CoreConfig::new(dir)?))
}

/// Persist an artefact. A failed write is reported on stderr and returned.
fn write_artefact(
    exporter: &Exporter,
    out: &str,
    bytes: &[u8],
    what: &str,
) -> ReportResult<PathBuf> {
    exporter.persist(out, bytes).inspect_err(|e| {
        eprintln!("Error writing {what}: {e}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::ReportError;

    #[test]
    fn write_failures_are_returned() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(CoreConfig::new(tmp.path().to_path_buf()).unwrap());

        let path = write_artefact(&exporter, "letter.docx", b"PK", "letter").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"PK");

        let err = write_artefact(&exporter, "../letter.docx", b"PK", "letter").unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));

        std::fs::create_dir(tmp.path().join("taken")).unwrap();
        let err = write_artefact(&exporter, "taken", b"PK", "letter").unwrap_err();
        assert!(matches!(err, ReportError::Persistence { .. }));
    }
}
