//! The module table and its function implementations.

use super::args::Args;
use super::failure::{HostError, HostResult};
use super::value::{LockRef, Value};
use crate::clock;
use crate::config::Config;
use crate::error::Result;
use crate::identity;
use crate::journal::{Journal, JournalAction, JournalEvent};
use crate::locks::{self, LockOptions};
use crate::numeric;
use crate::perms::{self, Mode};
use serde_json::json;
use std::os::fd::RawFd;

type HostFn = fn(&Module, &[Value]) -> HostResult;
type MethodFn = fn(&LockRef, &[Value]) -> HostResult;

/// Module-level functions, by host name.
const FUNCTIONS: &[(&str, HostFn)] = &[
    ("lock", lock),
    ("finite", finite),
    ("get_pid", get_pid),
    ("get_uid", get_uid),
    ("get_gid", get_gid),
    ("get_hostname", get_hostname),
    ("intcase", intcase),
    ("sleep", sleep),
    ("microtime", microtime),
    ("chmod", chmod),
    ("fchmod", fchmod),
];

/// Methods available on lock handles.
const LOCK_METHODS: &[(&str, MethodFn)] = &[
    ("unlock", lock_unlock),
    ("path", lock_path),
    ("is_locked", lock_is_locked),
    ("fd", lock_fd),
];

/// An opened module: configuration plus the function tables.
#[derive(Debug, Clone)]
pub struct Module {
    config: Config,
    lock_options: LockOptions,
    journal: Option<Journal>,
}

impl Module {
    /// Validate `config` and build the module.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let lock_options = config.lock_options()?;
        let journal = config.journal();

        Ok(Self {
            config,
            lock_options,
            journal,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the module-level functions.
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> {
        FUNCTIONS.iter().map(|(name, _)| *name)
    }

    /// Names of the lock handle methods.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> {
        LOCK_METHODS.iter().map(|(name, _)| *name)
    }

    /// Call the module function `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> HostResult {
        let f = FUNCTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| {
                HostError::new(format!("attempt to call a nil value (field '{}')", name))
            })?;
        f(self, args)
    }

    /// Call method `name` on `target`, which must be a lock handle.
    pub fn call_method(&self, target: &Value, name: &str, args: &[Value]) -> HostResult {
        let Some(&(method, f)) = LOCK_METHODS.iter().find(|(n, _)| *n == name) else {
            let message = match target.as_lock() {
                Some(_) => format!("attempt to call a nil value (method '{}')", name),
                None => format!(
                    "attempt to index a {} value (method '{}')",
                    target.type_name(),
                    name
                ),
            };
            return Err(HostError::new(message));
        };

        // The receiver is argument #1, as in `lock.unlock(handle)`.
        let lock = Args::new(method, std::slice::from_ref(target)).check_lock(1)?;
        f(lock, args)
    }
}

fn lock(module: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("lock", values);
    let path = args.check_string(1)?;

    let handle = locks::acquire_with(&path, &module.lock_options)?;
    Ok(vec![Value::from(handle)])
}

fn finite(_: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("finite", values);
    let n = args.to_number(1).unwrap_or(0.0);
    Ok(vec![Value::Boolean(numeric::finite(n))])
}

fn get_pid(_: &Module, _: &[Value]) -> HostResult {
    Ok(vec![Value::Integer(identity::get_pid().into())])
}

fn get_uid(_: &Module, _: &[Value]) -> HostResult {
    Ok(vec![Value::Integer(identity::get_uid().into())])
}

fn get_gid(_: &Module, _: &[Value]) -> HostResult {
    Ok(vec![Value::Integer(identity::get_gid().into())])
}

fn get_hostname(_: &Module, _: &[Value]) -> HostResult {
    Ok(vec![Value::String(identity::get_hostname()?)])
}

fn intcase(_: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("intcase", values);
    let n = args.check_integer(1)?;
    Ok(vec![Value::Integer(numeric::intcase(n).into())])
}

fn sleep(module: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("sleep", values);
    let seconds = args.opt_number(1, module.config.default_sleep_seconds)?;
    clock::sleep(seconds)?;
    Ok(Vec::new())
}

fn microtime(module: &Module, _: &[Value]) -> HostResult {
    Ok(vec![Value::Number(clock::microtime_with(module.config.clock)?)])
}

fn chmod(module: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("chmod", values);
    let path = args.check_string(1)?;
    let mode = mode_argument(&args, 2)?;

    perms::chmod(&path, mode)?;

    if let Some(journal) = &module.journal {
        journal.record(
            JournalEvent::new(JournalAction::Chmod)
                .with_path(&path)
                .with_details(json!({ "mode": mode.to_string() })),
        );
    }
    Ok(vec![Value::Boolean(true)])
}

fn fchmod(module: &Module, values: &[Value]) -> HostResult {
    let args = Args::new("fchmod", values);
    let fd = args.check_integer(1)?;
    let fd = RawFd::try_from(fd)
        .map_err(|_| HostError::bad_argument(1, "fchmod", "descriptor out of range"))?;
    let mode = mode_argument(&args, 2)?;

    perms::fchmod(fd, mode)?;

    if let Some(journal) = &module.journal {
        journal.record(
            JournalEvent::new(JournalAction::Chmod)
                .with_details(json!({ "fd": fd, "mode": mode.to_string() })),
        );
    }
    Ok(vec![Value::Boolean(true)])
}

/// Mode argument: any number, truncated toward zero, decoded digit-wise.
fn mode_argument(args: &Args<'_>, pos: usize) -> std::result::Result<Mode, HostError> {
    let n = args.check_number(pos)?;
    Ok(Mode::decode(n.trunc() as i64))
}

fn lock_unlock(lock: &LockRef, _: &[Value]) -> HostResult {
    lock.try_borrow_mut()
        .map_err(|_| HostError::new("lock handle is in use"))?
        .unlock();
    Ok(Vec::new())
}

fn lock_path(lock: &LockRef, _: &[Value]) -> HostResult {
    let handle = lock
        .try_borrow()
        .map_err(|_| HostError::new("lock handle is in use"))?;
    let value = match handle.path() {
        Some(path) => Value::String(path.to_string_lossy().to_string()),
        None => Value::Nil,
    };
    Ok(vec![value])
}

fn lock_is_locked(lock: &LockRef, _: &[Value]) -> HostResult {
    let handle = lock
        .try_borrow()
        .map_err(|_| HostError::new("lock handle is in use"))?;
    Ok(vec![Value::Boolean(handle.is_locked())])
}

fn lock_fd(lock: &LockRef, _: &[Value]) -> HostResult {
    let handle = lock
        .try_borrow()
        .map_err(|_| HostError::new("lock handle is in use"))?;
    let value = match handle.raw_fd() {
        Some(fd) => Value::Integer(fd.into()),
        None => Value::Nil,
    };
    Ok(vec![value])
}
