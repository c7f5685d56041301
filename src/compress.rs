//! PDF compression via Ghostscript.
//!
//! Shells out to `gs` with the pdfwrite device and a quality preset, then
//! reports progress while the child runs. Ghostscript gives no progress
//! feedback of its own, so the estimate is a heuristic over elapsed time
//! and the growing output file, capped below 100 until the child exits.
//!
//! Compression is infallible by signature: a missing input, `gs` absent
//! from `PATH`, a non-zero exit, or an I/O fault all fold into a
//! [`CompressionOutcome`] with `success: false` so callers handle every
//! failure through one path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::io::{derive_sibling, file_size, format_file_size};
use crate::progress::ProgressSink;
use crate::request::{CompressionOutcome, ConversionRequest, Quality};

/// Phase of a compression run, driving the progress estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionPhase {
    /// Child spawned, no output file yet.
    Starting,
    /// Output file exists and is growing.
    Running,
    /// Child exited, output being verified.
    Finalizing,
    /// Run complete and successful.
    Done,
    /// Run failed.
    Failed,
}

/// Estimated completion percentage for a compression run.
///
/// Before the output file exists the estimate ramps with elapsed time,
/// capped at 30. Once output appears it tracks the output size against an
/// assumed 50% compression ratio, capped at 95. The caller forces 100 when
/// the child exits.
pub fn estimate_progress(elapsed: Duration, input_size: u64, output_size: Option<u64>) -> u64 {
    match output_size {
        None | Some(0) => (elapsed.as_secs_f64() * 10.0).min(30.0) as u64,
        Some(out) => {
            if input_size == 0 {
                return 95;
            }
            let expected = input_size as f64 * 0.5;
            ((out as f64 / expected) * 100.0).min(95.0) as u64
        }
    }
}

/// Ghostscript argument list for compressing `input` to `output`.
fn gs_args(input: &Path, output: &Path, quality: Quality) -> Vec<String> {
    vec![
        "-sDEVICE=pdfwrite".into(),
        "-dCompatibilityLevel=1.4".into(),
        format!("-dPDFSETTINGS={}", quality.gs_setting()),
        "-dNOPAUSE".into(),
        "-dBATCH".into(),
        "-dQUIET".into(),
        "-dAutoRotatePages=/None".into(),
        "-dColorImageDownsampleType=/Bicubic".into(),
        "-dGrayImageDownsampleType=/Bicubic".into(),
        "-dMonoImageDownsampleType=/Subsample".into(),
        "-dEmbedAllFonts=true".into(),
        "-dSubsetFonts=true".into(),
        format!("-sOutputFile={}", output.display()),
        input.display().to_string(),
    ]
}

/// Default output path for a compressed copy of `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("pdf");
    derive_sibling(input, "compressed", ext)
}

fn failure(input_size: u64, message: impl Into<String>) -> CompressionOutcome {
    CompressionOutcome {
        success: false,
        ratio: 0.0,
        message: message.into(),
        output: None,
        input_size,
        output_size: None,
    }
}

/// Compress the request's single input PDF with Ghostscript.
///
/// Uses `request.output` when set, otherwise `<stem>_compressed.pdf` next
/// to the input. Progress runs on a 0..=100 percentage scale.
pub async fn compress(
    request: &ConversionRequest,
    progress: &mut dyn ProgressSink,
) -> CompressionOutcome {
    progress.start(100, "Compressing");
    let outcome = run(request, progress).await;
    progress.set_position(100);
    progress.close();
    outcome
}

async fn run(
    request: &ConversionRequest,
    progress: &mut dyn ProgressSink,
) -> CompressionOutcome {
    let Some(input) = request.inputs.first() else {
        return failure(0, "No input file specified");
    };
    if !input.is_file() {
        return failure(0, format!("File not found: {}", input.display()));
    }

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    let input_size = file_size(input);

    run_ghostscript(input, &output, request.quality, input_size, progress).await
}

async fn run_ghostscript(
    input: &Path,
    output: &Path,
    quality: Quality,
    input_size: u64,
    progress: &mut dyn ProgressSink,
) -> CompressionOutcome {
    let mut child = match Command::new("gs")
        .args(gs_args(input, output, quality))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return failure(
                input_size,
                format!("Failed to launch Ghostscript (is gs installed?): {e}"),
            );
        }
    };

    let started = Instant::now();
    let mut phase = CompressionPhase::Starting;
    let mut last_estimate = 0u64;
    let mut interval = tokio::time::interval(Duration::from_millis(100));

    let status = loop {
        interval.tick().await;

        match child.try_wait() {
            Ok(Some(status)) => break Ok(status),
            Ok(None) => {}
            Err(e) => break Err(e),
        }

        let output_size = output.is_file().then(|| file_size(output));
        if phase == CompressionPhase::Starting && matches!(output_size, Some(s) if s > 0) {
            phase = CompressionPhase::Running;
        }

        // The heuristic can regress when assumptions shift; clamp it.
        let estimate = estimate_progress(started.elapsed(), input_size, output_size)
            .max(last_estimate);
        if estimate > last_estimate {
            last_estimate = estimate;
            progress.set_position(estimate);
        }
    };

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            return failure(input_size, format!("Failed to wait for Ghostscript: {e}"));
        }
    };
    phase = CompressionPhase::Finalizing;

    let mut stderr_text = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        stderr.read_to_string(&mut stderr_text).await.ok();
    }

    let output_size = file_size(output);
    let phase = match phase {
        CompressionPhase::Finalizing if status.success() && output_size > 0 => {
            CompressionPhase::Done
        }
        _ => CompressionPhase::Failed,
    };

    if phase == CompressionPhase::Failed {
        if !status.success() {
            let detail = if stderr_text.trim().is_empty() {
                String::new()
            } else {
                format!(": {}", stderr_text.trim())
            };
            return failure(
                input_size,
                format!("Ghostscript exited with {status}{detail}"),
            );
        }
        return failure(input_size, "Ghostscript produced no output");
    }

    // Output can grow for already-tight PDFs; report zero, not negative.
    let ratio = if input_size > 0 {
        ((1.0 - output_size as f64 / input_size as f64) * 100.0).max(0.0)
    } else {
        0.0
    };

    CompressionOutcome {
        success: true,
        ratio,
        message: format!(
            "Compressed {} -> {} ({ratio:.1}% reduction)",
            format_file_size(input_size),
            format_file_size(output_size),
        ),
        output: Some(output.to_path_buf()),
        input_size,
        output_size: Some(output_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::save_basic_document;
    use crate::progress::{NoopProgress, RecordingProgress};
    use crate::request::ConversionRequest;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(0.0, None, 0)]
    #[case(1.5, None, 15)]
    #[case(10.0, None, 30)]
    #[case(60.0, None, 30)]
    fn test_estimate_before_output(
        #[case] secs: f64,
        #[case] output: Option<u64>,
        #[case] expected: u64,
    ) {
        let got = estimate_progress(Duration::from_secs_f64(secs), 1_000_000, output);
        assert_eq!(got, expected);
    }

    #[rstest]
    #[case(1_000_000, 100_000, 20)]
    #[case(1_000_000, 250_000, 50)]
    #[case(1_000_000, 500_000, 95)]
    #[case(1_000_000, 2_000_000, 95)]
    fn test_estimate_with_output(#[case] input: u64, #[case] output: u64, #[case] expected: u64) {
        let got = estimate_progress(Duration::from_secs(60), input, Some(output));
        assert_eq!(got, expected);
    }

    #[test]
    fn test_estimate_zero_sized_output_uses_time_ramp() {
        let got = estimate_progress(Duration::from_secs(1), 1_000_000, Some(0));
        assert_eq!(got, 10);
    }

    #[test]
    fn test_estimate_zero_input_size() {
        let got = estimate_progress(Duration::from_secs(1), 0, Some(500));
        assert_eq!(got, 95);
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/docs/report.pdf")),
            PathBuf::from("/docs/report_compressed.pdf")
        );
    }

    #[test]
    fn test_gs_args_flag_set() {
        let args = gs_args(Path::new("in.pdf"), Path::new("out.pdf"), Quality::Ebook);
        assert!(args.contains(&"-sDEVICE=pdfwrite".to_string()));
        assert!(args.contains(&"-dPDFSETTINGS=/ebook".to_string()));
        assert!(args.contains(&"-dAutoRotatePages=/None".to_string()));
        assert!(args.contains(&"-sOutputFile=out.pdf".to_string()));
        // Input is the trailing positional argument.
        assert_eq!(args.last().map(String::as_str), Some("in.pdf"));
    }

    #[tokio::test]
    async fn test_compress_missing_input_is_failure_outcome() {
        let request = ConversionRequest::new(vec![PathBuf::from("/nonexistent/in.pdf")]);
        let outcome = compress(&request, &mut NoopProgress).await;
        assert!(!outcome.success);
        assert_eq!(outcome.ratio, 0.0);
        assert!(outcome.output.is_none());
        assert!(outcome.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_compress_no_inputs_is_failure_outcome() {
        let request = ConversionRequest::new(vec![]);
        let outcome = compress(&request, &mut NoopProgress).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_compress_progress_reaches_100_even_on_failure() {
        let mut recorder = RecordingProgress::new();
        let request = ConversionRequest::new(vec![PathBuf::from("/nonexistent/in.pdf")]);
        let outcome = compress(&request, &mut recorder).await;
        assert!(!outcome.success);
        assert_eq!(recorder.final_position(), 100);
        assert!(recorder.is_monotonic());
    }

    #[tokio::test]
    #[ignore = "requires Ghostscript on PATH"]
    async fn test_compress_end_to_end() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.pdf");
        save_basic_document(&input, 612.0, 792.0).unwrap();
        let output = dir.path().join("compressed.pdf");

        let request = ConversionRequest::new(vec![input]).with_output(&output);
        let mut recorder = RecordingProgress::new();
        let outcome = compress(&request, &mut recorder).await;

        assert!(outcome.success, "{}", outcome.message);
        assert!(output.exists());
        assert!((0.0..=100.0).contains(&outcome.ratio));
        assert_eq!(recorder.final_position(), 100);
        assert!(recorder.is_monotonic());
    }
}
