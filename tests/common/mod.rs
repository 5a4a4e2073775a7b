// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed repository and home directory, a
// scripted executor standing in for brew/stow, and a context builder so each
// integration test can run the real task list without touching the machine.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use provision_cli::config::Config;
use provision_cli::exec::{ExecResult, Executor};
use provision_cli::logging::{Log, Logger};
use provision_cli::mode::Mode;
use provision_cli::operations::SystemFileSystemOps;
use provision_cli::platform::{Arch, Os, Platform};
use provision_cli::prompt::Prompt;
use provision_cli::tasks::Context;
use provision_cli::tools::Tools;
use provision_cli::tools::download::{DownloadError, Downloader};

/// Stow's verbose simulation output for a package with one pending link.
pub const PENDING_LINK: &str = "LINK: .zshrc => dotfiles/packages/zsh/dot-zshrc\n\
                                WARNING: in simulation mode so not modifying filesystem.\n";

/// An isolated repository and home directory backed by a [`tempfile::TempDir`].
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("repo/packages")).expect("create packages");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home");
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Add a package containing `files` (paths relative to the package).
    #[must_use]
    pub fn with_package(self, name: &str, files: &[&str]) -> Self {
        let dir = self.root().join("packages").join(name);
        std::fs::create_dir_all(&dir).expect("create package dir");
        for file in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create parent");
            }
            std::fs::write(&path, format!("# {file}\n")).expect("write package file");
        }
        self
    }

    /// Write a file at the repository root.
    #[must_use]
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        std::fs::write(self.root().join(rel), content).expect("write repo file");
        self
    }

    /// Write a file into the home directory.
    #[must_use]
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        std::fs::write(self.home().join(rel), content).expect("write home file");
        self
    }

    /// Names in the home directory, sorted.
    pub fn home_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.home())
            .expect("read home")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home().join(rel)).unwrap_or_default()
    }

    pub fn config(&self) -> Config {
        Config::load(&self.root()).expect("load config")
    }
}

type Matcher = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Executor that answers by matching the command line against rules.
///
/// Unmatched commands succeed with empty output. `brew` and `stow` are
/// reported as installed under `/usr/local/bin`.
pub struct ScriptedExecutor {
    rules: Vec<(Matcher, bool, String)>,
    calls: Mutex<Vec<String>>,
}

impl std::fmt::Debug for ScriptedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedExecutor")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands matching `pred` with `success` and `stderr`.
    #[must_use]
    pub fn on(
        mut self,
        pred: impl Fn(&str) -> bool + Send + Sync + 'static,
        success: bool,
        stderr: &str,
    ) -> Self {
        self.rules.push((Box::new(pred), success, stderr.to_string()));
        self
    }

    /// Every stow simulation reports one pending link.
    #[must_use]
    pub fn with_pending_links(self) -> Self {
        self.on(is_simulation, true, PENDING_LINK)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        let (success, stderr) = self
            .rules
            .iter()
            .find(|(pred, _, _)| pred(&line))
            .map_or((true, String::new()), |(_, ok, err)| (*ok, err.clone()));
        ExecResult {
            stdout: String::new(),
            stderr,
            success,
            code: Some(i32::from(!success)),
        }
    }
}

/// A `stow --no` simulation.
pub fn is_simulation(line: &str) -> bool {
    line.contains("stow --no ")
}

/// A real `stow` run of `package`.
pub fn is_install_of(line: &str, package: &str) -> bool {
    line.contains("stow --dotfiles") && line.ends_with(&format!(" {package}"))
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.answer(program, args);
        if !result.success {
            anyhow::bail!("{program} failed");
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        matches!(program, "brew" | "stow").then(|| Path::new("/usr/local/bin").join(program))
    }
}

/// Downloader that must never be reached because `brew` is present.
#[derive(Debug)]
pub struct Offline;

impl Downloader for Offline {
    fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        Err(DownloadError::NotFound {
            url: url.to_string(),
        })
    }
}

/// Prompt that always declines.
#[derive(Debug)]
pub struct Decline;

impl Prompt for Decline {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// Build a context for an Intel Mac rooted at `repo`.
pub fn context(
    repo: &TestRepo,
    executor: Arc<ScriptedExecutor>,
    mode: Mode,
    dry_run: bool,
) -> (Context, Arc<Logger>) {
    let log = Arc::new(Logger::with_log_file(None));
    let ctx = Context {
        config: Arc::new(repo.config()),
        platform: Arc::new(Platform::new(Os::MacOs, Arch::X86_64)),
        log: Arc::clone(&log) as Arc<dyn Log>,
        dry_run,
        mode,
        home: repo.home(),
        packages: Vec::new(),
        tools: Tools::default(),
        executor,
        prompt: Arc::new(Decline),
        fs_ops: Arc::new(SystemFileSystemOps),
    };
    (ctx, log)
}
