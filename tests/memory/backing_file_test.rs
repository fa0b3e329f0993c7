/*!
 * Backing File Tests
 * Creation, mapping and removal on every exit path
 */

use memprobe::memory::BackingFile;
use memprobe::ProbeError;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_file_is_filled_and_removed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pagefault_test");

    {
        let backing = BackingFile::create(&path, 3 * 4096, b'A', 4096).unwrap();
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk.len(), 3 * 4096);
        assert!(on_disk.iter().all(|&b| b == b'A'));
        assert_eq!(backing.len(), 3 * 4096);
    }

    assert!(!path.exists());
}

#[test]
fn test_existing_file_is_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pagefault_test");
    std::fs::write(&path, vec![b'Z'; 10 * 4096]).unwrap();

    let backing = BackingFile::create(&path, 4096, b'A', 4096).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);
    drop(backing);
    assert!(!path.exists());
}

#[test]
fn test_mapping_sees_file_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapped");
    let backing = BackingFile::create(&path, 8 * 4096, b'A', 4096).unwrap();

    let mapping = backing.map_read_only().unwrap();
    assert_eq!(mapping.len(), 8 * 4096);
    assert_eq!(mapping.touch_checksum(4096), 8u8.wrapping_mul(b'A'));
}

#[test]
fn test_missing_directory_is_backing_file_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent").join("pagefault_test");

    let err = BackingFile::create(&path, 4096, b'A', 4096).unwrap_err();
    assert!(matches!(err, ProbeError::BackingFile { .. }));
    assert!(!path.exists());
}
