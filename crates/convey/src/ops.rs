pub mod convert;
pub mod snippet;

use convey_conversion::{ConversionProgress, ConversionResult};

/// Prints progress events to stderr.
fn print_progress(progress: ConversionProgress) {
    if progress.weight == 0 {
        eprintln!("{}", progress.message);
    } else {
        eprintln!("  {}", progress.message);
    }
}

/// Prints the errors of a result to stderr. Returns false if there were any.
fn report_errors(result: &ConversionResult) -> bool {
    let label = result
        .source_path
        .as_ref()
        .map_or_else(|| "snippet".to_owned(), ToString::to_string);
    for error in &result.errors {
        eprintln!("error: {label}: {error}");
    }
    result.is_success()
}
