//! ExternalTool against a shell script standing in for the runtime.
//!
//! The script reads the class name and the rendered arguments and behaves
//! like the vendor tools: exports copy `<props-stem>.screens/<screen>.xml`,
//! diffs compare their inputs, inserts copy `<props-stem>.tables/<table>`.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use mxpatch_core::config::EnvironmentConfig;
use mxpatch_core::{Config, EnvironmentName, EnvironmentRegistry, ResolvedEnvironment};
use mxpatch_invoker::{ExternalTool, ToolInvoker, ToolRequest};
use tempfile::TempDir;

const FAKE_RUNTIME: &str = r#"#!/bin/sh
while [ "$#" -gt 0 ] && [ "$1" != "-classpath" ]; do shift; done
shift 2
class="$1"; shift
for arg in "$@"; do
  case "$arg" in
    -a*) a="${arg#-a}" ;;
    -p*) p="${arg#-p}" ;;
    -b*) b="${arg#-b}" ;;
    -t*) t="${arg#-t}" ;;
    -m*) m="${arg#-m}" ;;
    -f*) f="${arg#-f}" ;;
    -w*) w="${arg#-w}" ;;
  esac
done
[ -n "$FAKE_TOOL_LOG" ] && echo "$class $*" >> "$FAKE_TOOL_LOG"
case "$class" in
  *Export)
    src="${p%.properties}.screens/$a.xml"
    if [ ! -f "$src" ]; then echo "no such presentation $a" >&2; exit 1; fi
    cp "$src" "./$a.xml" ;;
  *Diff)
    if cmp -s "$b" "$t"; then
      printf '<changes>\n</changes>\n' > "./$m.mxs"
    else
      printf '<changes>\n<presentation id="x">\n</presentation>\n</changes>\n' > "./$m.mxs"
    fi ;;
  *)
    src="${p%.properties}.tables/$t"
    [ -f "$src" ] || exit 1
    cp "$src" "./$f.dbc" ;;
esac
exit 0
"#;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    config: Config,
    log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();

        let runtime = root.join("bin").join("java");
        std::fs::create_dir_all(runtime.parent().unwrap()).unwrap();
        std::fs::write(&runtime, FAKE_RUNTIME).unwrap();
        std::fs::set_permissions(&runtime, std::fs::Permissions::from_mode(0o755)).unwrap();

        let log = root.join("tool.log");
        let mut config = Config::new(root.join("maximo"));
        config.toolchain.runtime = Some(runtime);
        config.toolchain.classpath = vec![root.join("lib")];
        config
            .toolchain
            .env
            .insert("FAKE_TOOL_LOG".to_string(), log.display().to_string());
        for name in ["DEV", "TEST"] {
            config.environments.insert(
                EnvironmentName::from(name),
                EnvironmentConfig {
                    properties: root.join(format!("{name}.properties")),
                },
            );
            std::fs::create_dir_all(root.join(format!("{name}.screens"))).unwrap();
            std::fs::create_dir_all(root.join(format!("{name}.tables"))).unwrap();
        }
        Self {
            _dir: dir,
            root,
            config,
            log,
        }
    }

    fn screen(&self, env: &str, name: &str, body: &str) {
        std::fs::write(self.root.join(format!("{env}.screens/{name}.xml")), body).unwrap();
    }

    fn table(&self, env: &str, name: &str, body: &str) {
        std::fs::write(self.root.join(format!("{env}.tables/{name}")), body).unwrap();
    }

    fn env(&self, name: &str) -> ResolvedEnvironment {
        EnvironmentRegistry::from_config(&self.config)
            .resolve(name)
            .unwrap()
    }

    fn tool(&self) -> ExternalTool {
        ExternalTool::from_config(&self.config, None).unwrap()
    }

    fn log(&self) -> String {
        std::fs::read_to_string(&self.log).unwrap_or_default()
    }
}

#[test]
fn export_is_moved_to_environment_tagged_name() {
    let fx = Fixture::new();
    fx.screen("DEV", "ASSET", "<presentation id=\"asset\"/>");
    let dev = fx.env("DEV");

    let path = fx
        .tool()
        .invoke(&ToolRequest::Export {
            resource: "ASSET",
            env: &dev,
        })
        .unwrap()
        .expect("export exists");

    let export_root = fx.config.export_root();
    assert_eq!(path, export_root.join("ASSET-DEV.xml"));
    assert!(!export_root.join("ASSET.xml").exists());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "<presentation id=\"asset\"/>"
    );
}

#[test]
fn missing_screen_yields_none() {
    let fx = Fixture::new();
    let dev = fx.env("DEV");
    let result = fx
        .tool()
        .invoke(&ToolRequest::Export {
            resource: "NOPE",
            env: &dev,
        })
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn stale_artifact_is_not_reported_as_fresh() {
    let fx = Fixture::new();
    let export_root = fx.config.export_root();
    std::fs::create_dir_all(&export_root).unwrap();
    std::fs::write(export_root.join("GHOST.xml"), "left over").unwrap();

    let dev = fx.env("DEV");
    let result = fx
        .tool()
        .invoke(&ToolRequest::Export {
            resource: "GHOST",
            env: &dev,
        })
        .unwrap();
    assert!(result.is_none());
    assert!(!export_root.join("GHOST.xml").exists());
}

#[test]
fn diff_of_identical_exports_lacks_marker() {
    let fx = Fixture::new();
    let dir = fx.root.join("in");
    std::fs::create_dir_all(&dir).unwrap();
    let (a, b, c) = (dir.join("a.xml"), dir.join("b.xml"), dir.join("c.xml"));
    std::fs::write(&a, "<presentation/>").unwrap();
    std::fs::write(&b, "<presentation/>").unwrap();
    std::fs::write(&c, "<presentation changed=\"1\"/>").unwrap();
    let tool = fx.tool();

    let same = diff(&tool, &a, &b, "SAME");
    assert!(!std::fs::read_to_string(same).unwrap().contains("</presentation>"));

    let changed = diff(&tool, &a, &c, "CHANGED");
    assert_eq!(changed, fx.config.export_root().join("CHANGED.mxs"));
    assert!(std::fs::read_to_string(changed)
        .unwrap()
        .contains("</presentation>"));
}

fn diff(tool: &ExternalTool, base: &Path, target: &Path, outfile: &str) -> PathBuf {
    tool.invoke(&ToolRequest::Diff {
        base,
        target,
        outfile,
    })
    .unwrap()
    .expect("diff output")
}

#[test]
fn inserts_land_in_output_root_with_filter_passed_through() {
    let fx = Fixture::new();
    fx.table("DEV", "ASSETATTRIBUTE", "INSERT INTO assetattribute ...");
    let dev = fx.env("DEV");

    let path = fx
        .tool()
        .invoke(&ToolRequest::Inserts {
            table: "ASSETATTRIBUTE",
            filter: Some("assetattrid like 'PUMP%'"),
            outfile: "V1000_006",
            env: &dev,
        })
        .unwrap()
        .expect("inserts written");

    assert_eq!(path, fx.config.output_root().join("V1000_006.dbc"));
    let log = fx.log();
    assert!(log.contains("GenInsertDML"), "log was: {log}");
    assert!(log.contains("-wassetattrid like 'PUMP%'"), "log was: {log}");
}

#[test]
fn missing_table_yields_none() {
    let fx = Fixture::new();
    let test = fx.env("TEST");
    let result = fx
        .tool()
        .invoke(&ToolRequest::Inserts {
            table: "NOTATABLE",
            filter: None,
            outfile: "V1000_001",
            env: &test,
        })
        .unwrap();
    assert!(result.is_none());
}
