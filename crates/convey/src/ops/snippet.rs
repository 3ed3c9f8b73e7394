use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Context;
use convey_conversion::{convert_text, ConversionOptions};
use convey_idl::IdlConversion;
use convey_syntax::{TextRange, TextSize};

use crate::{
    ops::{print_progress, report_errors},
    ExitStatus,
};

#[derive(clap::Args)]
pub struct Args {
    /// File that contains the snake snippet
    path: PathBuf,

    /// Only converts the code between two byte offsets, formatted as START..END
    #[clap(long, value_name = "START..END", value_parser = parse_selection)]
    selection: Option<TextRange>,
}

/// Converts a standalone snippet and prints the converted code to stdout.
pub fn snippet(args: Args) -> Result<ExitStatus, anyhow::Error> {
    log::trace!("converting snippet {}", args.path.display());

    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("could not read '{}'", args.path.display()))?;
    let options = ConversionOptions {
        selected_text_span: args.selection,
        ..ConversionOptions::default()
    };

    let result = convert_text(Arc::new(IdlConversion::new()), &text, options, print_progress)?;
    if let Some(code) = &result.converted_code {
        print!("{code}");
    }
    Ok(report_errors(&result).into())
}

fn parse_selection(argument: &str) -> Result<TextRange, String> {
    let (start, end) = argument
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, found '{argument}'"))?;
    let offset = |text: &str| {
        text.trim()
            .parse::<u32>()
            .map(TextSize::from)
            .map_err(|error| format!("invalid offset '{text}': {error}"))
    };
    let (start, end) = (offset(start)?, offset(end)?);
    if start > end {
        return Err(format!("selection {argument} ends before it starts"));
    }
    Ok(TextRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use convey_syntax::TextRange;

    use super::parse_selection;

    #[test]
    fn selection_is_parsed_as_range() {
        assert_eq!(
            parse_selection("4..10"),
            Ok(TextRange::new(4.into(), 10.into()))
        );
    }

    #[test]
    fn malformed_selections_are_rejected() {
        assert!(parse_selection("4").is_err());
        assert!(parse_selection("a..10").is_err());
        assert_eq!(
            parse_selection("10..4"),
            Err("selection 10..4 ends before it starts".to_owned())
        );
    }
}
