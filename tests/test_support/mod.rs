use camino::Utf8PathBuf;
use optiview::PipelineWorkspace;
use tempfile::TempDir;

/// Path to the compiled stub engine, resolved at compile time.
pub fn engine_stub() -> &'static str {
    env!("CARGO_BIN_EXE_engine-stub")
}

/// A workspace in its own temp directory. Keep the `TempDir` alive for the
/// duration of the test.
pub fn temp_workspace() -> (TempDir, PipelineWorkspace) {
    let td = TempDir::new().expect("create temp workspace");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    (td, PipelineWorkspace::new(root))
}

/// Write the stub's per-workspace control file.
pub fn write_stub_control(workspace: &PipelineWorkspace, control: &str) {
    std::fs::write(workspace.root().join("stub_control.toml"), control)
        .expect("write stub control");
}
