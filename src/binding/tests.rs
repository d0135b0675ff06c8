//! Tests for the host binding.

use super::*;
use crate::config::Config;
use crate::journal::{Journal, JournalAction};
use serial_test::serial;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn module() -> Module {
    Module::open(Config::default()).unwrap()
}

fn path_value(path: &Path) -> Value {
    Value::from(path.to_str().unwrap())
}

fn single(result: HostResult) -> Value {
    let mut values = result.unwrap();
    assert_eq!(values.len(), 1, "expected one return value: {:?}", values);
    values.remove(0)
}

#[test]
fn test_function_table_is_complete() {
    let m = module();
    let names: Vec<&str> = m.function_names().collect();
    for expected in [
        "lock",
        "finite",
        "get_pid",
        "get_uid",
        "get_gid",
        "get_hostname",
        "intcase",
        "sleep",
        "microtime",
        "chmod",
        "fchmod",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
    assert!(m.method_names().any(|n| n == "unlock"));
}

#[test]
fn test_unknown_function() {
    let err = module().call("fork", &[]).unwrap_err();
    assert_eq!(err.message, "attempt to call a nil value (field 'fork')");
    assert_eq!(err.code, None);
}

#[test]
fn test_open_rejects_invalid_config() {
    let config = Config {
        lock_file_mode: 999,
        ..Config::default()
    };
    assert!(Module::open(config).is_err());
}

#[test]
fn test_lock_and_explicit_unlock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.lock");
    let m = module();

    let handle = single(m.call("lock", &[path_value(&path)]));
    assert!(handle.as_lock().is_some());
    assert!(path.exists());
    assert_eq!(
        single(m.call_method(&handle, "is_locked", &[])),
        Value::Boolean(true)
    );
    assert_eq!(
        single(m.call_method(&handle, "path", &[])),
        path_value(&path)
    );

    let err = m.call("lock", &[path_value(&path)]).unwrap_err();
    assert!(err.message.starts_with("already locked (by another process?)"));
    assert_eq!(err.code, None);

    assert!(m.call_method(&handle, "unlock", &[]).unwrap().is_empty());
    assert!(!path.exists());
    assert_eq!(
        single(m.call_method(&handle, "is_locked", &[])),
        Value::Boolean(false)
    );
    assert_eq!(single(m.call_method(&handle, "path", &[])), Value::Nil);
    assert_eq!(single(m.call_method(&handle, "fd", &[])), Value::Nil);

    // A second unlock is harmless.
    m.call_method(&handle, "unlock", &[]).unwrap();
}

#[test]
fn test_dropping_last_reference_releases_lock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.lock");
    let m = module();

    let handle = single(m.call("lock", &[path_value(&path)]));
    let alias = handle.clone();
    drop(handle);

    // Still referenced through `alias`.
    assert!(path.exists());
    assert!(m.call("lock", &[path_value(&path)]).is_err());

    drop(alias);
    assert!(!path.exists());
    assert!(m.call("lock", &[path_value(&path)]).is_ok());
}

#[test]
fn test_unlock_then_drop_releases_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.lock");
    let m = module();

    let handle = single(m.call("lock", &[path_value(&path)]));
    m.call_method(&handle, "unlock", &[]).unwrap();

    let other = single(m.call("lock", &[path_value(&path)]));
    drop(handle);

    // The new holder's file is untouched by the old handle's finalizer.
    assert!(path.exists());
    drop(other);
    assert!(!path.exists());
}

#[test]
fn test_lock_argument_errors() {
    let m = module();

    let err = m.call("lock", &[]).unwrap_err();
    assert_eq!(
        err.message,
        "bad argument #1 to 'lock' (string expected, got no value)"
    );

    let err = m.call("lock", &[Value::Boolean(true)]).unwrap_err();
    assert_eq!(
        err.message,
        "bad argument #1 to 'lock' (string expected, got boolean)"
    );
}

#[test]
fn test_lock_os_error_carries_code() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("job.lock");

    let err = module().call("lock", &[path_value(&path)]).unwrap_err();
    assert_eq!(err.code, Some(libc::ENOENT));
}

#[test]
fn test_method_on_non_lock() {
    let m = module();

    let err = m.call_method(&Value::Integer(1), "unlock", &[]).unwrap_err();
    assert_eq!(
        err.message,
        "bad argument #1 to 'unlock' (lock expected, got number)"
    );

    let err = m.call_method(&Value::Nil, "path", &[]).unwrap_err();
    assert_eq!(err.message, "bad argument #1 to 'path' (lock expected, got nil)");

    let err = m.call_method(&Value::Boolean(true), "relock", &[]).unwrap_err();
    assert_eq!(
        err.message,
        "attempt to index a boolean value (method 'relock')"
    );
}

#[test]
fn test_unknown_method() {
    let dir = TempDir::new().unwrap();
    let m = module();
    let handle = single(m.call("lock", &[path_value(&dir.path().join("x.lock"))]));

    let err = m.call_method(&handle, "relock", &[]).unwrap_err();
    assert_eq!(err.message, "attempt to call a nil value (method 'relock')");
}

#[test]
fn test_finite() {
    let m = module();
    assert_eq!(single(m.call("finite", &[Value::Number(1.0)])), Value::Boolean(true));
    assert_eq!(
        single(m.call("finite", &[Value::Number(f64::INFINITY)])),
        Value::Boolean(false)
    );
    assert_eq!(
        single(m.call("finite", &[Value::Number(f64::NAN)])),
        Value::Boolean(false)
    );
    assert_eq!(single(m.call("finite", &[Value::Integer(3)])), Value::Boolean(true));
    // Non-numbers read as zero.
    assert_eq!(single(m.call("finite", &[])), Value::Boolean(true));
    assert_eq!(
        single(m.call("finite", &[Value::from("inf")])),
        Value::Boolean(false)
    );
}

#[test]
fn test_identity_functions() {
    let m = module();
    assert_eq!(
        single(m.call("get_pid", &[])),
        Value::Integer(std::process::id().into())
    );
    assert_eq!(
        single(m.call("get_uid", &[])),
        Value::Integer(crate::identity::get_uid().into())
    );
    assert_eq!(
        single(m.call("get_gid", &[])),
        Value::Integer(crate::identity::get_gid().into())
    );
    assert!(single(m.call("get_hostname", &[])).as_str().is_some());
}

#[test]
fn test_intcase() {
    let m = module();
    let cases = [(0, 0), (1, 1), (2, 2), (5, 0), (11, 0), (21, 1), (22, 2), (-21, 1)];
    for (input, expected) in cases {
        assert_eq!(
            single(m.call("intcase", &[Value::Integer(input)])),
            Value::Integer(expected),
            "intcase({})",
            input
        );
    }

    let err = m.call("intcase", &[Value::Number(2.5)]).unwrap_err();
    assert!(err.message.contains("no integer representation"));
}

#[test]
#[serial]
fn test_sleep() {
    let m = module();
    let start = Instant::now();
    assert!(m.call("sleep", &[Value::Number(0.05)]).unwrap().is_empty());
    assert!(start.elapsed() >= Duration::from_millis(49));

    // Default comes from config.
    m.call("sleep", &[]).unwrap();

    let err = m.call("sleep", &[Value::Number(-1.0)]).unwrap_err();
    assert!(err.message.contains("sleep duration"));
}

#[test]
#[serial]
fn test_microtime() {
    let m = module();
    let a = single(m.call("microtime", &[])).as_number().unwrap();
    let b = single(m.call("microtime", &[])).as_number().unwrap();
    assert!(a > 1_000_000_000.0);
    assert!(b >= a - 0.001 && b - a < 1.0);
}

#[test]
fn test_chmod() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.sh");
    fs::write(&path, "").unwrap();
    let m = module();

    let result = single(m.call("chmod", &[path_value(&path), Value::Integer(755)]));
    assert_eq!(result, Value::Boolean(true));
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o755);

    // Digits are decoded without validation: 8 reads as octal 10.
    m.call("chmod", &[path_value(&path), Value::Integer(8)])
        .unwrap();
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o010);

    // Fractions truncate toward zero.
    m.call("chmod", &[path_value(&path), Value::Number(644.5)])
        .unwrap();
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o644);

    m.call("chmod", &[path_value(&path), Value::from("600")])
        .unwrap();
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o600);

    let err = m
        .call("chmod", &[path_value(&path), Value::Boolean(true)])
        .unwrap_err();
    assert_eq!(
        err.message,
        "bad argument #2 to 'chmod' (number expected, got boolean)"
    );

    let err = m
        .call("chmod", &[path_value(&dir.path().join("nope")), Value::Integer(644)])
        .unwrap_err();
    assert_eq!(err.code, Some(libc::ENOENT));
}

#[test]
fn test_fchmod_on_lock_descriptor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.lock");
    let m = module();

    let handle = single(m.call("lock", &[path_value(&path)]));
    let fd = single(m.call_method(&handle, "fd", &[]));

    let result = single(m.call("fchmod", &[fd, Value::Number(600.0)]));
    assert_eq!(result, Value::Boolean(true));
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o600);

    let fd = single(m.call_method(&handle, "fd", &[]));
    single(m.call("fchmod", &[fd, Value::Number(9.9)]));
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o7777, 0o011);

    let err = m
        .call("fchmod", &[Value::Integer(i64::MAX), Value::Integer(644)])
        .unwrap_err();
    assert!(err.message.contains("descriptor out of range"));
}

#[test]
fn test_journal_records_host_calls() {
    let dir = TempDir::new().unwrap();
    let journal_path = dir.path().join("journal.ndjson");
    let config = Config {
        journal_path: Some(journal_path.clone()),
        ..Config::default()
    };
    let m = Module::open(config).unwrap();
    let lock_file = dir.path().join("job.lock");

    let handle = single(m.call("lock", &[path_value(&lock_file)]));
    let script = dir.path().join("run.sh");
    fs::write(&script, "").unwrap();
    m.call("chmod", &[path_value(&script), Value::Integer(700)])
        .unwrap();
    drop(handle);

    let actions: Vec<JournalAction> = Journal::new(&journal_path)
        .read_all()
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            JournalAction::LockAcquired,
            JournalAction::Chmod,
            JournalAction::LockReleased,
        ]
    );
}
