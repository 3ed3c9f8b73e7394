use convey_paths::RelativePathBuf;
use itertools::Itertools;

const DEFAULT_FILE_NAME: &str = "main.txt";
const META_LINE: &str = "//-";

/// A single file of a test project. A whole project is described by one string in which every
/// file starts with a meta line that holds its path:
///
/// ```not_rust
/// //- /address.sidl
/// type address { street: string; }
///
/// //- /models/person.sidl
/// type person { home: address; }
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Fixture {
    /// The path of the file relative to the root of the project
    pub relative_path: RelativePathBuf,

    pub text: String,
}

impl Fixture {
    /// Splits `text` into fixtures. Text without any meta line becomes a single fixture named
    /// `main.txt`.
    pub fn parse(text: impl AsRef<str>) -> Vec<Fixture> {
        let text = trim_raw_string_literal(text);

        let implicit_meta_line = if text.contains(META_LINE) {
            None
        } else {
            Some(format!("{META_LINE} /{DEFAULT_FILE_NAME}"))
        };

        let mut fixtures: Vec<Fixture> = Vec::new();
        for (index, line) in implicit_meta_line
            .as_deref()
            .into_iter()
            .chain(text.lines())
            .enumerate()
        {
            if line.contains(META_LINE) {
                assert!(
                    line.starts_with(META_LINE),
                    "meta line {index} must not be indented: {line:?}"
                );
                fixtures.push(Fixture::from_meta_line(line));
            } else if let Some(fixture) = fixtures.last_mut() {
                fixture.text.push_str(line);
                fixture.text.push('\n');
            }
        }
        fixtures
    }

    fn from_meta_line(line: &str) -> Fixture {
        let path = line[META_LINE.len()..]
            .split_ascii_whitespace()
            .next()
            .unwrap_or_default();
        let Some(path) = path.strip_prefix('/') else {
            panic!("the path of a fixture must start with '/': {line:?}");
        };
        Fixture {
            relative_path: RelativePathBuf::from(path),
            text: String::new(),
        }
    }
}

/// Removes the first line break and the common indentation of `text`, which makes it easy to
/// embed fixtures in indented raw string literals.
pub fn trim_raw_string_literal(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    let text = text.strip_prefix('\n').unwrap_or(text);

    let indentation = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            if line.len() <= indentation {
                line.trim_start_matches(' ')
            } else {
                &line[indentation..]
            }
        })
        .join("\n")
}
