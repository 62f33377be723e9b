use mcpset_fs::{NormalizedPath, io};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".cursor").join("mcp.json"));

    io::write_atomic(&path, b"{}").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.toml");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("config.json"));

    io::write_atomic(&path, b"one").unwrap();
    io::write_atomic(&path, b"two").unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["config.json".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_write_atomic_into_read_only_dir_fails_without_touching_target() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("locked");
    fs::create_dir(&dir).unwrap();
    let file_path = dir.join("config.json");
    fs::write(&file_path, "original").unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

    let result = io::write_atomic(&NormalizedPath::new(&file_path), b"new");

    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
    // Root ignores directory permissions; only assert when the write was refused.
    if result.is_err() {
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");
    }
}

#[cfg(unix)]
#[test]
fn test_write_keeps_private_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(".claude.json");
    fs::write(&file_path, "{\"mcpServers\": {}}").unwrap();
    fs::set_permissions(&file_path, fs::Permissions::from_mode(0o600)).unwrap();

    io::write_text(&NormalizedPath::new(&file_path), "{\"mcpServers\": {\"a\": {}}}").unwrap();

    let mode = fs::metadata(&file_path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    assert_eq!(
        fs::read_to_string(&file_path).unwrap(),
        "{\"mcpServers\": {\"a\": {}}}"
    );
}

#[cfg(unix)]
#[test]
fn test_write_through_symlink_keeps_link() {
    let temp = TempDir::new().unwrap();
    let dotfiles = temp.path().join("dotfiles");
    fs::create_dir(&dotfiles).unwrap();
    let real = dotfiles.join("claude.json");
    fs::write(&real, "{}").unwrap();
    let link = temp.path().join(".claude.json");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    io::write_text(&NormalizedPath::new(&link), "{\"updated\": true}").unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), "{\"updated\": true}");
    let names: Vec<String> = fs::read_dir(&dotfiles)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["claude.json".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_write_through_dangling_relative_symlink_creates_target() {
    let temp = TempDir::new().unwrap();
    let link = temp.path().join("mcp.json");
    std::os::unix::fs::symlink("store/mcp.json", &link).unwrap();

    io::write_text(&NormalizedPath::new(&link), "{}").unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(temp.path().join("store").join("mcp.json")).unwrap(),
        "{}"
    );
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/mcpset/file.json");
    assert!(io::read_text(&path).is_err());
}

#[test]
fn test_read_optional_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.json"));
    assert_eq!(io::read_optional(&path).unwrap(), None);
}

#[test]
fn test_read_optional_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("present.json");
    fs::write(&file_path, "{}").unwrap();

    let content = io::read_optional(&NormalizedPath::new(&file_path)).unwrap();
    assert_eq!(content.as_deref(), Some("{}"));
}
