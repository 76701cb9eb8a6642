use super::*;
use tempfile::TempDir;

// =========================================================================
// Helper Tests
// =========================================================================

#[test]
fn test_format_progress() {
    let line = format_progress(RowProgress { index: 3, total: 12 });
    assert_eq!(line, "   Processing row 3 of 12 (25%)");
}

#[test]
fn test_output_path_explicit() {
    let profile = Profile::default();
    let path = output_path(Some(PathBuf::from("out.xlsx")), &profile);
    assert_eq!(path, PathBuf::from("out.xlsx"));
}

#[test]
fn test_output_path_date_stamped() {
    let profile = Profile::default();
    let path = output_path(None, &profile);
    let name = path.to_string_lossy().to_string();
    assert!(name.starts_with("ImportadorGenerico_RELLENO_"));
    assert!(name.ends_with(".xlsx"));
}

#[test]
fn test_read_artifact_missing_template_is_template_error() {
    let err = read_artifact(Path::new("/nonexistent/plantilla.xlsx"), "template").unwrap_err();
    assert!(matches!(err, FuelmapError::TemplateRead(_)));
}

#[test]
fn test_read_artifact_missing_data_is_source_error() {
    let err = read_artifact(Path::new("/nonexistent/datos.xlsx"), "data").unwrap_err();
    assert!(matches!(err, FuelmapError::SourceRead(_)));
}

// =========================================================================
// Command Tests
// =========================================================================

#[test]
fn test_template_command_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("blank.xlsx");

    let result = template(output.clone(), None);

    assert!(result.is_ok());
    assert!(output.exists());
}

#[test]
fn test_profile_command_with_bad_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile.yaml");
    fs::write(&path, "columns: []\n").unwrap();

    let err = profile(Some(path)).unwrap_err();
    assert!(matches!(err, FuelmapError::Profile(_)));
}

#[test]
fn test_check_command_rejects_garbage_files() {
    let temp_dir = TempDir::new().unwrap();
    let template_path = temp_dir.path().join("plantilla.xlsx");
    let data_path = temp_dir.path().join("datos.xlsx");
    fs::write(&template_path, b"not a workbook").unwrap();
    fs::write(&data_path, b"not a workbook either").unwrap();

    // source is read first, so the data file is reported
    let err = check(template_path, data_path, None).unwrap_err();
    assert!(matches!(err, FuelmapError::SourceRead(_)));
}
