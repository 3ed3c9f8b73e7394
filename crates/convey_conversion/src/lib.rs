//! Converts documents and whole projects from one language to another.
//!
//! A conversion runs in two phases. The first phase translates every document on its own,
//! resolving symbols through a *shadow* compilation: a reference only project that shows how
//! the symbols of the source project look in the target language. The translated documents are
//! then merged into a converted project, after which the second phase improves and formats
//! every document with the whole converted project available. Documents are processed in
//! parallel within a phase, but the second phase only starts once the first one finished.
//!
//! A failure converting a single document never aborts a conversion. It is recorded with the
//! result of that document, which still carries as much converted code as possible. Faults
//! that a language cannot recover from are contained by a [`CrashGuard`].
//!
//! The languages themselves are provided through the [`LanguageConversion`] trait.

mod contents_converter;
mod crash_guard;
mod error;
mod executor;
mod language;
mod options;
mod progress;
mod project_conversion;
mod result;
mod selection;
mod wip;

#[cfg(test)]
mod mock;

pub use crate::{
    contents_converter::ProjectContentsConverter,
    crash_guard::{CrashGuard, EngineFault, FatalErrorHandler, FatalErrorHook},
    error::{ConversionError, TranslationError},
    executor::max_degree_of_parallelism,
    language::{LanguageConversion, ShadowCompilation},
    options::ConversionOptions,
    progress::{ConversionProgress, IgnoreProgress, ProgressSink, ReportProgress},
    project_conversion::{
        convert_project, convert_single, convert_text, ProjectConversionResults,
    },
    result::ConversionResult,
    wip::{annotation_errors, attach, resolve, WipFileConversion},
};
