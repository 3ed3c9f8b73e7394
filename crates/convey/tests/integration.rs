use std::fs;

use convey::{run_with_args, ExitStatus};
use convey_test::TestWorkspace;

const PROJECT: &str = r#"
//- /shop.sproj
<Project>
  <PropertyGroup>
    <Language>snake</Language>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="customer.sidl" />
  </ItemGroup>
</Project>
//- /customer.sidl
type customer {
    full_name: string;
    loyalty_points: int;
}
"#;

#[test]
fn convert_writes_converted_project_to_out_dir() {
    let workspace = TestWorkspace::from_fixture(PROJECT);
    let out_dir = tempfile::Builder::new()
        .prefix("convert_out_dir")
        .tempdir()
        .unwrap();

    let status = run_with_args(vec![
        "convey".into(),
        "convert".into(),
        "--manifest-path".into(),
        workspace.path("shop.sproj").as_os_str().to_owned(),
        "--out-dir".into(),
        out_dir.path().as_os_str().to_owned(),
        "--replace".into(),
        "<Project>=<Project Sdk=\"Pascal\">".into(),
    ])
    .unwrap();
    assert_eq!(status, ExitStatus::Success);

    assert_eq!(
        fs::read_to_string(out_dir.path().join("customer.pidl")).unwrap(),
        "record Customer {\n    fullName: String;\n    loyaltyPoints: Int32;\n}\n"
    );
    let manifest = fs::read_to_string(out_dir.path().join("shop.pproj")).unwrap();
    assert!(manifest.starts_with("<Project Sdk=\"Pascal\">"));
    assert!(manifest.contains("<Language>pascal</Language>"));
    assert!(manifest.contains("<Compile Include=\"customer.pidl\" />"));

    // The sources are left alone
    assert!(!workspace.path("customer.pidl").exists());
}

#[test]
fn convert_reports_failing_documents() {
    let workspace = TestWorkspace::from_fixture(
        r#"
        //- /broken.sproj
        <Project />
        //- /broken.sidl
        type broken {
        "#,
    );

    let status = run_with_args(vec![
        "convey".into(),
        "convert".into(),
        "--manifest-path".into(),
        workspace.path("broken.sproj").as_os_str().to_owned(),
    ])
    .unwrap();
    assert_eq!(status, ExitStatus::Error);
    assert!(!workspace.path("broken.pidl").exists());
}

#[test]
fn convert_fails_on_missing_manifest() {
    let dir = tempfile::Builder::new()
        .prefix("convert_missing_manifest")
        .tempdir()
        .unwrap();

    let result = run_with_args(vec![
        "convey".into(),
        "convert".into(),
        "--manifest-path".into(),
        dir.path().join("missing.sproj").into_os_string(),
    ]);
    assert!(result.is_err());
}

#[test]
fn snippet_converts_selection() {
    let dir = tempfile::Builder::new()
        .prefix("snippet_converts_selection")
        .tempdir()
        .unwrap();
    let path = dir.path().join("snippet.sidl");
    fs::write(&path, "first_name: string;\nage: int;\n").unwrap();

    let status = run_with_args(vec![
        "convey".into(),
        "snippet".into(),
        path.into_os_string(),
        "--selection".into(),
        "20..29".into(),
    ])
    .unwrap();
    assert_eq!(status, ExitStatus::Success);
}
