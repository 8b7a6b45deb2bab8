use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::PathBuf;

use pal_unix::{fs, stat, AccessChecks, PalError, SysConfName};

#[test]
fn mkdir_chmod_and_stat() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("sub");

    fs::mkdir(&dir, 0o755).unwrap();
    fs::chmod(&dir, 0o700).unwrap();

    let status = stat::stat(&dir).unwrap();
    assert_eq!(status.mode & libc::S_IFMT as u32, libc::S_IFDIR as u32);
    assert_eq!(status.permissions() & 0o777, 0o700);
}

#[test]
fn rmdir_removes_only_empty_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("d");
    fs::mkdir(&dir, 0o755).unwrap();
    std::fs::write(dir.join("occupant"), b"x").unwrap();

    assert!(fs::rmdir(&dir).is_err());

    fs::unlink(&dir.join("occupant")).unwrap();
    fs::rmdir(&dir).unwrap();
    assert!(stat::stat(&dir).is_err());
}

#[test]
fn rename_replaces_the_destination() {
    let tmp = tempfile::tempdir().unwrap();
    let old = tmp.path().join("old");
    let new = tmp.path().join("new");
    std::fs::write(&old, b"payload").unwrap();
    std::fs::write(&new, b"stale").unwrap();

    fs::rename(&old, &new).unwrap();

    assert!(stat::stat(&old).is_err());
    assert_eq!(std::fs::read(&new).unwrap(), b"payload");
}

#[test]
fn hard_link_shares_the_inode() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("a");
    let link = tmp.path().join("b");
    std::fs::write(&source, b"content").unwrap();

    fs::link(&source, &link).unwrap();

    let a = stat::stat(&source).unwrap();
    let b = stat::stat(&link).unwrap();
    assert_eq!((a.dev, a.inode), (b.dev, b.inode));
}

#[test]
fn symlink_is_reported_by_lstat_and_followed_by_stat() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("target");
    let link = tmp.path().join("link");
    std::fs::write(&target, b"content").unwrap();

    fs::symlink(&target, &link).unwrap();

    let via_lstat = stat::lstat(&link).unwrap();
    assert_eq!(via_lstat.mode & libc::S_IFMT as u32, libc::S_IFLNK as u32);

    let via_stat = stat::stat(&link).unwrap();
    assert_eq!(via_stat.mode & libc::S_IFMT as u32, libc::S_IFREG as u32);
    assert_eq!(via_stat.size, 7);

    let read_back = fs::readlink(&link).unwrap();
    assert_eq!(PathBuf::from(std::ffi::OsString::from_vec(read_back)), target);
}

#[test]
fn realpath_resolves_to_an_absolute_canonical_path() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("file");
    std::fs::write(&file, b"x").unwrap();

    let indirect = tmp.path().join(".").join("file");
    let resolved = fs::realpath(&indirect).unwrap();

    assert!(resolved.is_absolute());
    assert_eq!(resolved, std::fs::canonicalize(&file).unwrap());
}

#[test]
fn access_distinguishes_existence_from_permission() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("file");
    std::fs::write(&file, b"x").unwrap();

    fs::access(&file, AccessChecks::EXISTS).unwrap();
    fs::access(&file, AccessChecks::READ).unwrap();

    let missing = tmp.path().join("missing");
    let err = fs::access(&missing, AccessChecks::EXISTS).unwrap_err();
    assert_eq!(err.os_code(), Some(libc::ENOENT));
}

#[test]
fn interior_nul_in_a_path_is_invalid_input() {
    let path = PathBuf::from(std::ffi::OsString::from_vec(b"bad\0path".to_vec()));
    assert_eq!(fs::unlink(&path), Err(PalError::InvalidArgument));
    assert_eq!(stat::stat(&path).unwrap_err(), PalError::InvalidArgument);
}

#[test]
fn mkstemps_fills_placeholders_and_keeps_the_suffix() {
    let tmp = tempfile::tempdir().unwrap();
    let template_path = tmp.path().join("scratch-XXXXXX.dat");
    let mut template = template_path.as_os_str().as_bytes().to_vec();

    let fd = fs::mkstemps(&mut template, 4).unwrap();

    let created = PathBuf::from(std::ffi::OsString::from_vec(template.clone()));
    assert!(created.to_string_lossy().ends_with(".dat"));
    assert_ne!(created, template_path);
    stat::stat(&created).unwrap();
    pal_unix::io::close(fd).unwrap();
}

#[test]
fn mkstemps_rejects_a_suffix_longer_than_the_template() {
    let mut template = b"XXXXXX".to_vec();
    assert!(matches!(
        fs::mkstemps(&mut template, 1),
        Err(PalError::InvalidArgument)
    ));
}

#[cfg(not(target_os = "android"))]
#[test]
fn shared_memory_objects_open_and_unlink() {
    use std::os::fd::AsFd;

    use pal_unix::OpenFlags;

    let name = format!("/pal-shm-test-{}", std::process::id());
    let fd = fs::shm_open(
        &name,
        OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::EXCLUSIVE,
        0o600,
    )
    .unwrap();

    pal_unix::io::ftruncate(fd.as_fd(), 4096).unwrap();
    assert_eq!(stat::fstat(fd.as_fd()).unwrap().size, 4096);

    pal_unix::io::close(fd).unwrap();
    fs::shm_unlink(&name).unwrap();
    // The name is gone; a second unlink reports it.
    assert!(fs::shm_unlink(&name).is_err());
}

#[test]
fn sysconf_reports_positive_values() {
    assert!(fs::sysconf(SysConfName::PageSize).unwrap() > 0);
    assert!(fs::sysconf(SysConfName::ClockTicksPerSecond).unwrap() > 0);
}

#[test]
fn chdir_rejects_a_missing_directory() {
    // Changing into the current directory is a no-op; other tests in this
    // process depend on the working directory staying put.
    let cwd = std::env::current_dir().unwrap();
    fs::chdir(&cwd).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let err = fs::chdir(&tmp.path().join("missing")).unwrap_err();
    assert_eq!(err.os_code(), Some(libc::ENOENT));
}
