//! Best-effort rewriting of project manifests.
//!
//! Manifests are never parsed. Every change is a regular expression substitution on the raw
//! text of the manifest, a substitution whose pattern does not match leaves the text untouched.

use std::{fs, io};

use convey_paths::AbsPathBuf;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest replacement pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("could not read manifest {path}")]
    Io {
        path: AbsPathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single regular expression substitution. `replace` may refer to capture groups of `find`
/// with `$1` or `${name}`.
#[derive(Debug, Clone)]
pub struct TextReplacement {
    find: Regex,
    replace: String,
    first_only: bool,
}

impl TextReplacement {
    pub fn new(
        find: &str,
        replace: impl Into<String>,
        first_only: bool,
    ) -> Result<Self, ManifestError> {
        let find = Regex::new(find).map_err(|source| ManifestError::InvalidPattern {
            pattern: find.to_owned(),
            source,
        })?;
        Ok(TextReplacement {
            find,
            replace: replace.into(),
            first_only,
        })
    }

    pub fn apply(&self, text: &str) -> String {
        let limit = if self.first_only { 1 } else { 0 };
        self.find
            .replacen(text, limit, self.replace.as_str())
            .into_owned()
    }
}

/// Rewrites the manifest of a converted project.
///
/// Caller supplied replacements are applied first, followed by the declaration of added compile
/// items, the language version and the root namespace. Each of the built-in substitutions only
/// affects the first match and is skipped when there is nothing to substitute.
#[derive(Debug, Clone, Default)]
pub struct ManifestRewriter {
    replacements: Vec<TextReplacement>,
    added_items: Vec<String>,
    compile_extensions: Vec<String>,
    language_version: Option<String>,
    root_namespace: Option<String>,
}

impl ManifestRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replacements(
        mut self,
        replacements: impl IntoIterator<Item = TextReplacement>,
    ) -> Self {
        self.replacements.extend(replacements);
        self
    }

    /// Declares new compile items, paths are relative to the manifest directory.
    pub fn with_added_items(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.added_items.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the extensions of the files that existing compile items refer to. New items are
    /// inserted in front of the first existing item that refers to one of these extensions.
    pub fn with_compile_extensions(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.compile_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language_version(mut self, language_version: Option<String>) -> Self {
        self.language_version = language_version;
        self
    }

    pub fn with_root_namespace(mut self, root_namespace: Option<String>) -> Self {
        self.root_namespace = root_namespace;
        self
    }

    /// Applies all substitutions to `text`.
    pub fn rewrite(&self, text: &str) -> Result<String, ManifestError> {
        let mut text = text.to_owned();
        for replacement in &self.replacements {
            text = replacement.apply(&text);
        }

        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        for replacement in self.builtin_replacements(newline)? {
            text = replacement.apply(&text);
        }
        Ok(text)
    }

    /// Reads the manifest at `path` and applies all substitutions to its contents.
    pub fn rewrite_file(&self, path: &AbsPathBuf) -> Result<String, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        self.rewrite(&text)
    }

    fn builtin_replacements(&self, newline: &str) -> Result<Vec<TextReplacement>, ManifestError> {
        let mut replacements = Vec::new();

        if !self.added_items.is_empty() && !self.compile_extensions.is_empty() {
            let extensions = self
                .compile_extensions
                .iter()
                .map(|extension| regex::escape(extension.trim_start_matches('.')))
                .collect::<Vec<_>>()
                .join("|");
            let mut items = self.added_items.clone();
            items.sort();
            let declarations = items
                .iter()
                .map(|item| format!("{newline}    <Compile Include=\"{}\" />", escape(item)))
                .collect::<String>();
            replacements.push(TextReplacement::new(
                &format!(r#"(\s*<\s*Compile\s*Include\s*=\s*".*\.(?:{extensions})")"#),
                format!("{declarations}${{1}}"),
                true,
            )?);
        }

        if let Some(version) = &self.language_version {
            replacements.push(TextReplacement::new(
                r"<\s*LangVersion>[\s\S]*?</LangVersion\s*>",
                format!("<LangVersion>{}</LangVersion>", escape(version)),
                true,
            )?);
        }

        if let Some(namespace) = &self.root_namespace {
            replacements.push(TextReplacement::new(
                r"<\s*RootNamespace>[\s\S]*?</RootNamespace\s*>",
                format!("<RootNamespace>{}</RootNamespace>", escape(namespace)),
                true,
            )?);
        }

        Ok(replacements)
    }
}

/// Escapes a literal so it can be used as the replacement of a substitution.
fn escape(literal: &str) -> String {
    literal.replace('$', "$$")
}

#[cfg(test)]
mod tests {
    use super::{ManifestRewriter, TextReplacement};

    const MANIFEST: &str = r#"<Project>
  <PropertyGroup>
    <RootNamespace>Old.Name</RootNamespace>
    <LangVersion>1</LangVersion>
  </PropertyGroup>
  <PropertyGroup Condition="legacy">
    <LangVersion>0</LangVersion>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="src/a.pidl" />
    <Compile Include="src/b.pidl" />
  </ItemGroup>
</Project>"#;

    #[test]
    fn rewrites_first_declarations_and_adds_sorted_items() {
        let rewritten = ManifestRewriter::new()
            .with_added_items(["src/z.pidl", "Namespace.pidl"])
            .with_compile_extensions(["pidl"])
            .with_language_version(Some("2".to_owned()))
            .with_root_namespace(Some("New.Name".to_owned()))
            .rewrite(MANIFEST)
            .unwrap();

        insta::assert_snapshot!(rewritten, @r###"
        <Project>
          <PropertyGroup>
            <RootNamespace>New.Name</RootNamespace>
            <LangVersion>2</LangVersion>
          </PropertyGroup>
          <PropertyGroup Condition="legacy">
            <LangVersion>0</LangVersion>
          </PropertyGroup>
          <ItemGroup>
            <Compile Include="Namespace.pidl" />
            <Compile Include="src/z.pidl" />
            <Compile Include="src/a.pidl" />
            <Compile Include="src/b.pidl" />
          </ItemGroup>
        </Project>
        "###);
    }

    #[test]
    fn missing_patterns_are_skipped() {
        let manifest = "<Project>\n</Project>";
        let rewritten = ManifestRewriter::new()
            .with_added_items(["a.pidl"])
            .with_compile_extensions(["pidl"])
            .with_language_version(Some("2".to_owned()))
            .with_root_namespace(Some("Name".to_owned()))
            .rewrite(manifest)
            .unwrap();
        assert_eq!(rewritten, manifest);
    }

    #[test]
    fn nothing_to_substitute() {
        let rewritten = ManifestRewriter::new().rewrite(MANIFEST).unwrap();
        assert_eq!(rewritten, MANIFEST);
    }

    #[test]
    fn caller_replacements_are_applied_first() {
        let rename = TextReplacement::new(r"\.sidl", ".pidl", false).unwrap();
        let rewritten = ManifestRewriter::new()
            .with_replacements([rename])
            .with_added_items(["c.pidl"])
            .with_compile_extensions(["pidl"])
            .rewrite("<ItemGroup>\r\n  <Compile Include=\"a.sidl\" />\r\n</ItemGroup>")
            .unwrap();
        assert_eq!(
            rewritten,
            "<ItemGroup>\r\n    <Compile Include=\"c.pidl\" />\r\n  <Compile Include=\"a.pidl\" />\r\n</ItemGroup>"
        );
    }

    #[test]
    fn replacement_values_are_literal() {
        let rewritten = ManifestRewriter::new()
            .with_root_namespace(Some("$1.Name".to_owned()))
            .rewrite("<RootNamespace>Old</RootNamespace>")
            .unwrap();
        assert_eq!(rewritten, "<RootNamespace>$1.Name</RootNamespace>");
    }

    #[test]
    fn invalid_pattern() {
        assert!(TextReplacement::new("(", "", true).is_err());
    }
}
