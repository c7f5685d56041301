//! pdfsuite - Merge, compress, and convert PDF files.

use clap::Parser;
use std::process;

use pdfsuite::cli::{Cli, Command};
use pdfsuite::compress;
use pdfsuite::convert::{image_to_pdf, pdf_to_images};
use pdfsuite::error::PdfSuiteError;
use pdfsuite::io::format_file_size;
use pdfsuite::merge;
use pdfsuite::output::OutputFormatter;
use pdfsuite::progress::{NoopProgress, ProgressSink, TerminalProgress};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfSuiteError> {
    let formatter = OutputFormatter::new(cli.quiet || cli.json, cli.verbose);
    let mut progress: Box<dyn ProgressSink> = if cli.quiet || cli.json || cli.no_progress {
        Box::new(NoopProgress)
    } else {
        Box::new(TerminalProgress::new())
    };

    match &cli.command {
        Command::Merge(args) => {
            let request = args.to_request()?;
            formatter.info(&format!("Merging {} file(s)...", request.inputs.len()));

            let summary = merge::merge(&request, progress.as_mut()).await?;

            if cli.json {
                print_json(&summary)?;
                return Ok(());
            }
            formatter.success(&format!(
                "Successfully created {} ({} pages, {})",
                summary.output.display(),
                summary.total_pages,
                format_file_size(summary.output_size)
            ));
            if formatter.is_verbose() {
                formatter.detail("Input files", &summary.files_merged.to_string());
                formatter.detail("Total pages", &summary.total_pages.to_string());
                formatter.detail("Output size", &format_file_size(summary.output_size));
            }
        }

        Command::Compress(args) => {
            let request = args.to_request()?;
            formatter.info("Compressing...");

            let outcome = compress::compress(&request, progress.as_mut()).await;

            if cli.json {
                print_json(&outcome)?;
                if outcome.success {
                    return Ok(());
                }
                return Err(PdfSuiteError::processing_failed(outcome.message));
            }
            if outcome.success {
                formatter.success(&outcome.message);
                if formatter.is_verbose() {
                    formatter.detail("Input size", &format_file_size(outcome.input_size));
                    if let Some(size) = outcome.output_size {
                        formatter.detail("Output size", &format_file_size(size));
                    }
                    formatter.detail("Reduction", &format!("{:.1}%", outcome.ratio));
                }
            } else {
                formatter.error(&outcome.message);
                return Err(PdfSuiteError::processing_failed(outcome.message));
            }
        }

        Command::ImageToPdf(args) => {
            let request = args.to_request()?;
            formatter.info(&format!(
                "Converting {} image(s) to PDF...",
                request.inputs.len()
            ));

            let summary = image_to_pdf(&request, progress.as_mut()).await?;

            if cli.json {
                print_json(&summary)?;
                return Ok(());
            }
            match summary.output {
                Some(output) => formatter.success(&format!(
                    "Successfully created {} ({} pages)",
                    output.display(),
                    summary.pages
                )),
                None => formatter.warning("No input images, nothing to do"),
            }
        }

        Command::PdfToImage(args) => {
            let request = args.to_request()?;
            formatter.info(&format!(
                "Rendering {} PDF file(s) to images...",
                request.inputs.len()
            ));

            let summary = pdf_to_images(&request, progress.as_mut()).await?;

            if cli.json {
                print_json(&summary)?;
                return Ok(());
            }
            for (source, pages) in &summary.outputs {
                if pages.is_empty() {
                    formatter.warning(&format!("Skipped {}", source.display()));
                } else if formatter.is_verbose() {
                    formatter.detail(
                        &source.display().to_string(),
                        &format!("{} page(s)", pages.len()),
                    );
                }
            }

            let rendered_files = summary
                .outputs
                .values()
                .filter(|pages| !pages.is_empty())
                .count();
            formatter.success(&format!(
                "Rendered {} page(s) from {} file(s){}",
                summary.pages_rendered,
                rendered_files,
                if summary.files_failed > 0 {
                    format!(", {} failed", summary.files_failed)
                } else {
                    String::new()
                }
            ));
        }
    }

    Ok(())
}

/// Print a result summary as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), PdfSuiteError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| PdfSuiteError::other(format!("Failed to encode summary: {err}")))?;
    println!("{text}");
    Ok(())
}
