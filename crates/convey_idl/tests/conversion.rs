use std::sync::Arc;

use convey_conversion::{
    convert_project, convert_single, convert_text, ConversionError, ConversionOptions,
    ConversionResult, IgnoreProgress, LanguageConversion,
};
use convey_idl::IdlConversion;
use convey_project::{MetadataReference, Project, ProjectLoader, TextReplacement};
use convey_syntax::TextRange;
use convey_test::{in_memory_project, TestWorkspace};

const PEOPLE: &str = r#"
//- /address.sidl
// Where a person lives
type address {
    street: string;
    number: int;
}
//- /person.sidl
type person {
    first_name: string;
    home: address;
    id: person_id;
}

private type person_id { value: int; }
//- /order.sidl
type order {
    customer: person;
    total: float
}
"#;

fn people() -> Project {
    in_memory_project("people", IdlConversion.source_compilation_options(), PEOPLE)
}

fn convert(project: &Project, options: &ConversionOptions) -> Vec<ConversionResult> {
    convert_project(
        Arc::new(IdlConversion),
        project,
        options,
        IgnoreProgress,
        Vec::new(),
    )
    .unwrap()
    .collect()
}

#[test]
fn project_conversion_uses_names_of_other_converted_documents() {
    let results = convert(&people(), &ConversionOptions::default());
    assert_eq!(results.len(), 3);

    assert_eq!(
        results[0].converted_code.as_deref(),
        Some(
            "// Where a person lives\n\
             record Address {\n    street: String;\n    number: Int32;\n}\n"
        )
    );
    assert_eq!(
        results[1].converted_code.as_deref(),
        Some(
            "record Person {\n    firstName: String;\n    home: Address;\n    id: PersonId;\n}\n\n\
             internal record PersonId { value: Int32; }\n"
        )
    );
    assert!(results[0].is_success());
    assert!(results[1].is_success());

    let order = &results[2];
    assert_eq!(order.converted_code, None);
    assert!(order.errors[0].starts_with("syntax error: expected ';'"));
    assert_eq!(
        order.target_path.as_ref().and_then(|path| path.file_name()),
        Some("order.pidl".as_ref())
    );
}

#[test]
fn compilation_errors_are_reported_for_both_projects() {
    let project = in_memory_project(
        "people",
        IdlConversion.source_compilation_options(),
        "type person { boss: manager; }",
    );
    let options = ConversionOptions {
        show_compilation_errors: true,
        ..ConversionOptions::default()
    };
    let results = convert(&project, &options);

    assert_eq!(
        results[0].converted_code.as_deref(),
        Some("record Person { boss: Manager; }\n")
    );
    assert_eq!(results[0].errors, vec!["unresolved type 'manager'".to_owned()]);
    assert_eq!(
        results[1].errors,
        vec!["\n1 source compilation errors:\nmain.txt: unresolved type 'manager'\n\
              1 target compilation errors:\nmain.txt: unresolved type 'Manager'"
            .to_owned()]
    );
}

#[test]
fn selection_of_a_single_field() {
    let project = people();
    let person = project.documents().nth(1).unwrap();
    // `home: address;`
    let options = ConversionOptions {
        selected_text_span: Some(TextRange::new(42.into(), 56.into())),
        ..ConversionOptions::default()
    };
    let result = convert_single(Arc::new(IdlConversion), &person, options, IgnoreProgress).unwrap();

    // Only the selected document is converted, so `Address` stays qualified
    assert_eq!(
        result.converted_code.as_deref(),
        Some("home: global.Address;\n")
    );
    assert!(result.is_success());
}

#[test]
fn snippet_of_fields() {
    let options = ConversionOptions {
        references: vec![MetadataReference::new("time", ["date_time"])],
        ..ConversionOptions::default()
    };
    let result = convert_text(
        Arc::new(IdlConversion),
        "first_name: string; // given name\ncreated: date_time;",
        options,
        IgnoreProgress,
    )
    .unwrap();
    assert_eq!(
        result.converted_code.as_deref(),
        Some("firstName: String; // given name\ncreated: DateTime;\n")
    );
    assert!(result.is_success());
}

#[test]
fn snippet_of_definitions() {
    let result = convert_text(
        Arc::new(IdlConversion),
        "  type point {   x: float; y: float; }  ",
        ConversionOptions::default(),
        IgnoreProgress,
    )
    .unwrap();
    assert_eq!(
        result.converted_code.as_deref(),
        Some("record Point { x: Double; y: Double; }")
    );
}

#[test]
fn snippet_with_syntax_errors() {
    let result = convert_text(
        Arc::new(IdlConversion),
        "first_name string",
        ConversionOptions::default(),
        IgnoreProgress,
    );
    assert!(matches!(result, Err(ConversionError::Parse(_))));
}

#[test]
fn manifest_is_rewritten_for_the_converted_project() {
    let workspace = TestWorkspace::from_fixture(
        r#"
        //- /people.sproj
        <Project>
          <PropertyGroup>
            <Language>snake</Language>
            <LangVersion>0.9</LangVersion>
            <RootNamespace>Old</RootNamespace>
          </PropertyGroup>
          <ItemGroup>
            <Compile Include="models/person.sidl" />
          </ItemGroup>
        </Project>
        //- /models/person.sidl
        type person { name: string; }
        //- /bin/person.sidl
        type stale {}
        "#,
    );
    let project = ProjectLoader::new(IdlConversion.source_compilation_options(), "sidl")
        .load(workspace.path("people.sproj").as_path())
        .unwrap();
    let options = ConversionOptions {
        root_namespace_override: Some("People".to_owned()),
        ..ConversionOptions::default()
    };
    let header = TextReplacement::new("<Project>", "<Project Sdk=\"Pascal\">", true).unwrap();

    let results = convert_project(
        Arc::new(IdlConversion),
        &project,
        &options,
        IgnoreProgress,
        vec![header],
    )
    .unwrap()
    .collect::<Vec<_>>();

    let targets = results
        .iter()
        .map(|result| {
            let path = result.target_path.as_ref().unwrap();
            workspace.root().relative_path_to(path).unwrap().to_string()
        })
        .collect::<Vec<_>>();
    assert_eq!(
        targets,
        vec!["models/person.pidl", "Namespace.pidl", "people.pproj"]
    );
    assert_eq!(
        results[1].converted_code.as_deref(),
        Some("// Root namespace: People\n")
    );
    insta::assert_snapshot!(results[2].converted_code.as_deref().unwrap(), @r###"
    <Project Sdk="Pascal">
      <PropertyGroup>
        <Language>pascal</Language>
        <LangVersion>1.0</LangVersion>
        <RootNamespace>People</RootNamespace>
      </PropertyGroup>
      <ItemGroup>
        <Compile Include="Namespace.pidl" />
        <Compile Include="models/person.pidl" />
      </ItemGroup>
    </Project>
    "###);
}
