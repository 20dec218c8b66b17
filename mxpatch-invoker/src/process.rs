//! Process configuration for vendor tool runs.
//!
//! Everything a child process needs (runtime, classpath, heap, variables)
//! lives in [`ProcessConfig`] and is applied to each [`Command`] explicitly.
//! The parent process environment is never modified.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use mxpatch_core::Config;

use crate::error::InvokeError;

/// Runtime, classpath and child environment for every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub runtime: PathBuf,
    pub classpath: OsString,
    pub max_heap: Option<String>,
    pub env: BTreeMap<String, String>,
}

impl ProcessConfig {
    /// Locate the runtime and join the classpath from configuration.
    pub fn from_config(config: &Config) -> Result<Self, InvokeError> {
        let runtime = locate_runtime(config)?;
        let classpath = std::env::join_paths(config.classpath())
            .map_err(|e| InvokeError::Classpath(e.to_string()))?;
        tracing::debug!(runtime = %runtime.display(), "runtime located");
        Ok(Self {
            runtime,
            classpath,
            max_heap: config.toolchain.max_heap.clone(),
            env: config.toolchain.env.clone(),
        })
    }

    /// Build `<runtime> [-Xmx..] -classpath <cp> <class> <args..>` in `cwd`.
    ///
    /// Stdin and stdout are detached; stderr is piped so callers can log it.
    pub fn command(&self, class: &str, args: &[String], cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.runtime);
        if let Some(heap) = &self.max_heap {
            cmd.arg(format!("-Xmx{heap}"));
        }
        cmd.arg("-classpath")
            .arg(&self.classpath)
            .arg(class)
            .args(args)
            .current_dir(cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Find the runtime executable.
///
/// Order: configured `toolchain.runtime` → bundled JRE under `maximo_root` →
/// `$JAVA_HOME/bin` → `PATH`. A configured path that does not exist is an
/// error rather than a reason to keep searching.
pub fn locate_runtime(config: &Config) -> Result<PathBuf, InvokeError> {
    if let Some(explicit) = &config.toolchain.runtime {
        if explicit.is_file() {
            return Ok(explicit.clone());
        }
        return Err(InvokeError::RuntimeNotFound {
            searched: vec![explicit.clone()],
        });
    }

    let exe = format!("java{}", std::env::consts::EXE_SUFFIX);
    let mut searched = vec![config
        .maximo_root
        .join("tools")
        .join("java")
        .join("jre")
        .join("bin")
        .join(&exe)];
    if let Some(java_home) = std::env::var_os("JAVA_HOME") {
        searched.push(PathBuf::from(java_home).join("bin").join(&exe));
    }

    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    which::which("java").map_err(|_| InvokeError::RuntimeNotFound { searched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    #[test]
    fn explicit_runtime_is_used() {
        let dir = TempDir::new().unwrap();
        let runtime = dir.path().join("java");
        std::fs::write(&runtime, "").unwrap();

        let mut config = Config::new(dir.path().to_path_buf());
        config.toolchain.runtime = Some(runtime.clone());
        assert_eq!(locate_runtime(&config).unwrap(), runtime);
    }

    #[test]
    fn missing_explicit_runtime_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path().to_path_buf());
        config.toolchain.runtime = Some(dir.path().join("missing-java"));
        let err = locate_runtime(&config).unwrap_err();
        assert!(err.is_runtime_missing());
        assert!(err.to_string().contains("missing-java"));
    }

    #[test]
    fn bundled_jre_is_found_under_maximo_root() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("tools").join("java").join("jre").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let exe = bin.join(format!("java{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&exe, "").unwrap();

        let config = Config::new(dir.path().to_path_buf());
        assert_eq!(locate_runtime(&config).unwrap(), exe);
    }

    #[test]
    fn command_carries_heap_classpath_and_env() {
        let mut env = BTreeMap::new();
        env.insert("MXE_LANG".to_string(), "EN".to_string());
        let process = ProcessConfig {
            runtime: PathBuf::from("/jre/bin/java"),
            classpath: OsString::from("/a:/b"),
            max_heap: Some("1024m".to_string()),
            env,
        };
        let cmd = process.command("psdi.Tool", &["-aASSET".to_string()], Path::new("/work"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-Xmx1024m", "-classpath", "/a:/b", "psdi.Tool", "-aASSET"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/work")));
        let envs: Vec<_> = cmd.get_envs().collect();
        assert!(envs.contains(&(OsStr::new("MXE_LANG"), Some(OsStr::new("EN")))));
    }
}
