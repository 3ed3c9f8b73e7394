use std::{env, fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use convey_conversion::{convert_project, ConversionOptions, ConversionResult, LanguageConversion};
use convey_idl::{Dialect, IdlConversion};
use convey_paths::AbsPathBuf;
use convey_project::{find_manifest, ProjectLoader, TextReplacement};

use crate::{
    ops::{print_progress, report_errors},
    ExitStatus, SHOW_COMPILATION_ERRORS_ENV,
};

#[derive(clap::Args)]
pub struct Args {
    /// Path to the project manifest. Defaults to the manifest in the current directory
    #[clap(long)]
    manifest_path: Option<PathBuf>,

    /// Directory to write the converted project to. Defaults to next to the sources
    #[clap(long)]
    out_dir: Option<PathBuf>,

    /// Overrides the root namespace of the converted project
    #[clap(long)]
    root_namespace: Option<String>,

    /// Reports the compilation errors of the source and converted project
    #[clap(long)]
    show_compilation_errors: bool,

    /// Replaces text in the rewritten manifest, formatted as PATTERN=REPLACEMENT
    #[clap(long = "replace", value_name = "PATTERN=REPLACEMENT", value_parser = parse_replacement)]
    replacements: Vec<TextReplacement>,
}

/// Converts the project and writes every converted file.
pub fn convert(args: Args) -> Result<ExitStatus, anyhow::Error> {
    log::trace!("starting conversion");

    let manifest_path = match args.manifest_path {
        Some(path) => path,
        None => {
            let current_dir =
                env::current_dir().context("could not determine the current directory")?;
            let extension = Dialect::Snake.manifest_extension();
            find_manifest(&current_dir, extension).ok_or_else(|| {
                anyhow!(
                    "could not find a '.{extension}' manifest in {}",
                    current_dir.display()
                )
            })?
        }
    };

    let language = Arc::new(IdlConversion::new());
    let project = ProjectLoader::new(
        language.source_compilation_options(),
        Dialect::Snake.extension(),
    )
    .load(&manifest_path)?;
    let project_dir = project
        .directory_path()
        .context("could not determine the project directory")?;

    let show_compilation_errors = args.show_compilation_errors
        || env::var(SHOW_COMPILATION_ERRORS_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
    let options = ConversionOptions {
        root_namespace_override: args.root_namespace,
        show_compilation_errors,
        ..ConversionOptions::default()
    };

    let out_dir = args.out_dir.map(absolute).transpose()?;

    let mut success = true;
    for result in convert_project(
        language,
        &project,
        &options,
        print_progress,
        args.replacements,
    )? {
        success &= report_errors(&result);
        write_result(&result, &project_dir, out_dir.as_ref())?;
    }

    Ok(success.into())
}

/// Writes the converted code of `result`, relocated into `out_dir` if there is one.
fn write_result(
    result: &ConversionResult,
    project_dir: &AbsPathBuf,
    out_dir: Option<&AbsPathBuf>,
) -> Result<(), anyhow::Error> {
    let (Some(code), Some(target)) = (&result.converted_code, &result.target_path) else {
        return Ok(());
    };

    let destination = match out_dir {
        Some(out_dir) => {
            let relative = project_dir.relative_path_to(target).ok_or_else(|| {
                anyhow!("'{target}' is not located in the project directory '{project_dir}'")
            })?;
            relative.to_path(out_dir.as_path())
        }
        None => target.to_path_buf(),
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create directory '{}'", parent.display()))?;
    }
    fs::write(&destination, code)
        .with_context(|| format!("could not write '{}'", destination.display()))?;
    log::info!("wrote {}", destination.display());
    Ok(())
}

fn absolute(path: PathBuf) -> Result<AbsPathBuf, anyhow::Error> {
    if path.is_absolute() {
        Ok(AbsPathBuf::assert(path))
    } else {
        let current_dir = env::current_dir().context("could not determine the current directory")?;
        Ok(AbsPathBuf::assert(current_dir).join(path))
    }
}

/// Parses a `PATTERN=REPLACEMENT` argument. The pattern is split off at the first `=`.
fn parse_replacement(argument: &str) -> Result<TextReplacement, String> {
    let (pattern, replacement) = argument
        .split_once('=')
        .ok_or_else(|| format!("expected PATTERN=REPLACEMENT, found '{argument}'"))?;
    TextReplacement::new(pattern, replacement, false).map_err(|error| error.to_string())
}
