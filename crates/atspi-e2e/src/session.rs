//! Application bootstrap: launch the subject, wait for it to register on
//! the desktop and guarantee it is terminated afterwards.
//!
//! A [`Session`] owns the child process. The process is terminated exactly
//! once: by an explicit [`Session::terminate`], at the end of
//! [`Session::scoped`], or when the session is dropped, whichever comes
//! first. Dropping also covers early returns and panics in the test body.
//!
//! Discovery timing out is not an error by itself: the session is returned
//! without an application node and only entering it fails.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LaunchOptions;
use crate::node::Accessible;
use crate::result::{E2eError, E2eResult};

/// Source of the top-level application nodes
pub trait Desktop {
    /// Node type of the backend
    type Node: Accessible;

    /// Applications currently registered, in desktop order
    fn applications(&self) -> E2eResult<Vec<Self::Node>>;
}

/// First registered application whose name is `name`
pub fn find_application<D: Desktop>(desktop: &D, name: &str) -> E2eResult<Option<D::Node>> {
    for app in desktop.applications()? {
        if app.name()? == name {
            return Ok(Some(app));
        }
    }
    Ok(None)
}

/// Shortest pause between two desktop searches
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll the desktop until `name` registers or `timeout` elapses.
///
/// The desktop is searched at least once, and at most once per
/// `poll_interval` (never less than [`MIN_POLL_INTERVAL`]).
pub fn wait_for_app<D: Desktop>(
    desktop: &D,
    name: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> E2eResult<Option<D::Node>> {
    let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
    let start = Instant::now();
    loop {
        if let Some(app) = find_application(desktop, name)? {
            debug!(name, elapsed_ms = start.elapsed().as_millis(), "application registered");
            return Ok(Some(app));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Name the subject registers under when none is given
#[must_use]
pub fn unique_name(path: &Path) -> String {
    format!("{}-test-{}", path.display(), Uuid::new_v4().simple())
}

/// A launched application under test
#[derive(Debug)]
pub struct Session<N: Accessible> {
    process: Option<Child>,
    path: PathBuf,
    name: String,
    app: Option<N>,
}

/// Launch `path` and wait for it to register on `desktop`.
///
/// The program is started as `path [args...] --name <name>`.
pub fn launch<D: Desktop>(
    desktop: &D,
    path: impl AsRef<Path>,
    options: &LaunchOptions,
) -> E2eResult<Session<D::Node>> {
    let path = path.as_ref().to_path_buf();
    let name = options
        .name
        .clone()
        .unwrap_or_else(|| unique_name(&path));

    let child = Command::new(&path)
        .args(&options.args)
        .arg("--name")
        .arg(&name)
        .spawn()
        .map_err(|source| E2eError::Launch {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), name = %name, pid = child.id(), "subject launched");

    // from here on, any error still terminates the child through Drop
    let mut session = Session {
        process: Some(child),
        path,
        name,
        app: None,
    };
    session.app = wait_for_app(
        desktop,
        &session.name,
        options.timeout(),
        options.poll_interval(),
    )?;
    if session.app.is_none() {
        warn!(
            name = %session.name,
            timeout_ms = options.timeout_ms,
            "application did not register on the desktop"
        );
    }
    Ok(session)
}

/// Launch `path` against the AT-SPI desktop.
///
/// `timeout` defaults to five seconds.
#[cfg(feature = "atspi")]
pub fn run(
    path: impl AsRef<Path>,
    name: Option<&str>,
    timeout: Option<Duration>,
) -> E2eResult<Session<crate::atspi::AtspiNode>> {
    let desktop = crate::atspi::AtspiDesktop::connect()?;
    let mut options = LaunchOptions::from_env();
    if let Some(name) = name {
        options = options.with_name(name);
    }
    if let Some(timeout) = timeout {
        options = options.with_timeout_ms(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
    }
    launch(&desktop, path, &options)
}

impl<N: Accessible> Session<N> {
    /// Application node, if it registered in time
    #[must_use]
    pub fn app(&self) -> Option<&N> {
        self.app.as_ref()
    }

    /// Name the application was launched with
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Launched program
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Process id, until the session is terminated
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(Child::id)
    }

    /// Whether the subject process is still alive
    pub fn is_running(&mut self) -> bool {
        self.process
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Application node, failing when it never registered
    pub fn enter(&self) -> E2eResult<&N> {
        self.app.as_ref().ok_or_else(|| E2eError::ApplicationNotFound {
            path: self.path.display().to_string(),
            name: self.name.clone(),
        })
    }

    /// Run `body` with the application node, then terminate the subject.
    ///
    /// When the application never registered, `body` does not run.
    pub fn scoped<R>(mut self, body: impl FnOnce(&N) -> E2eResult<R>) -> E2eResult<R> {
        let result = match self.enter() {
            Ok(app) => {
                let app = app.clone();
                body(&app)
            }
            Err(e) => Err(e),
        };
        self.terminate();
        result
    }

    /// Terminate the subject process. Calling it again does nothing.
    pub fn terminate(&mut self) {
        let Some(mut child) = self.process.take() else {
            return;
        };
        let pid = child.id();
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid, %status, "subject already exited");
                return;
            }
            Ok(None) => {}
            Err(e) => warn!(pid, error = %e, "could not query subject status"),
        }
        if let Err(e) = child.kill() {
            warn!(pid, error = %e, "failed to kill subject");
        }
        match child.wait() {
            Ok(status) => info!(pid, %status, "subject terminated"),
            Err(e) => warn!(pid, error = %e, "failed to reap subject"),
        }
    }
}

impl<N: Accessible> Drop for Session<N> {
    fn drop(&mut self) {
        self.terminate();
    }
}
