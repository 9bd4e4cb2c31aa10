//! Integration tests for demand

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::os::unix::fs::{symlink, PermissionsExt};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Scratch area with a fake Go toolchain that logs its invocations
    struct Sandbox {
        temp: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self::with_program(r#"echo "name=$(basename "$0") args=$*""#)
        }

        /// Sandbox whose built binaries run `body` as a shell script.
        /// `body` must not contain single quotes or `%`.
        fn with_program(body: &str) -> Self {
            let sandbox = Self {
                temp: TempDir::new().unwrap(),
            };
            let script = format!(
                r#"#!/bin/sh
echo "GOPATH=$GOPATH $*" >> '{log}'
case "$1" in
  get)
    case "$4" in
      *broken*) echo "cannot find package" >&2; exit 1 ;;
    esac
    ;;
  build)
    printf '#!/bin/sh\n{body}\n' > "$3"
    chmod +x "$3"
    ;;
esac
"#,
                log = sandbox.log().display(),
                body = body
            );
            write_executable(&sandbox.go(), &script);
            sandbox
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn go(&self) -> PathBuf {
            self.path().join("fake-go")
        }

        fn log(&self) -> PathBuf {
            self.path().join("go.log")
        }

        fn cache(&self) -> PathBuf {
            self.path().join("cache")
        }

        fn toolchain_calls(&self) -> Vec<String> {
            std::fs::read_to_string(self.log())
                .map(|s| s.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }

        fn spec(&self, name: &str, import: &str) -> PathBuf {
            let path = self.path().join(name);
            std::fs::write(&path, format!("go:\n  import: {}\n", import)).unwrap();
            path
        }

        fn demand(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("demand");
            cmd.env("DEMAND_CACHE_DIR", self.cache())
                .env("DEMAND_GO", self.go())
                .env("DEMAND_CONFIG", self.path().join("no-config.toml"))
                .env_remove("GOPATH");
            cmd
        }
    }

    fn write_executable(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("demand")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("#!/usr/bin/env demand"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("demand")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("demand"));
    }

    #[test]
    fn missing_spec_is_usage_error() {
        cargo_bin_cmd!("demand").assert().code(2);
    }

    #[test]
    fn first_run_builds_then_execs() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/hello");

        sb.demand()
            .arg(&spec)
            .args(["a", "--flag"])
            .assert()
            .success()
            .stdout("name=hello args=a --flag\n");

        let calls = sb.toolchain_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].ends_with("get -d -- example.com/hello"));
        assert!(calls[1].contains("build -o"));
    }

    #[test]
    fn second_run_is_pure_cache_hit() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/hello");

        sb.demand().arg(&spec).assert().success();
        sb.demand()
            .arg(&spec)
            .assert()
            .success()
            .stdout("name=hello args=\n");

        assert_eq!(sb.toolchain_calls().len(), 2);
    }

    #[test]
    fn upgrade_rebuilds() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/hello");

        sb.demand().arg(&spec).assert().success();
        sb.demand().arg("--upgrade").arg(&spec).assert().success();

        assert_eq!(sb.toolchain_calls().len(), 4);
    }

    #[test]
    fn symlinked_spec_reuses_binary_under_its_own_name() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/hello");
        let alias = sb.path().join("greet");
        symlink(&spec, &alias).unwrap();

        sb.demand().arg(&spec).assert().success();
        sb.demand()
            .arg(&alias)
            .arg("x")
            .assert()
            .success()
            .stdout("name=greet args=x\n");

        assert_eq!(sb.toolchain_calls().len(), 2);
    }

    #[test]
    fn build_only_builds_every_spec_without_running() {
        let sb = Sandbox::new();
        let one = sb.spec("one", "example.com/one");
        let two = sb.spec("two", "example.com/two");

        sb.demand()
            .arg("--build")
            .arg(&one)
            .arg(&two)
            .assert()
            .success()
            .stdout("");

        assert_eq!(sb.toolchain_calls().len(), 4);
        let built: Vec<_> = walk_files(&sb.cache());
        assert!(built.iter().any(|p| p.ends_with("one")));
        assert!(built.iter().any(|p| p.ends_with("two")));
    }

    #[test]
    fn fetch_failure_is_reported() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/broken");

        sb.demand()
            .arg(&spec)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not fetch example.com/broken"))
            .stderr(predicate::str::contains("cannot find package"));

        assert!(walk_files(&sb.cache()).is_empty());
    }

    #[test]
    fn hidden_spec_is_refused() {
        let sb = Sandbox::new();
        let spec = sb.spec(".hello", "example.com/hello");

        sb.demand()
            .arg(&spec)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("refusing to run hidden spec file"));

        assert!(!sb.cache().exists());
        assert!(sb.toolchain_calls().is_empty());
    }

    #[test]
    fn spec_without_import_is_refused() {
        let sb = Sandbox::new();
        let spec = sb.path().join("hello");
        std::fs::write(&spec, "go:\n").unwrap();

        sb.demand()
            .arg(&spec)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Cannot parse spec file"));

        assert!(sb.toolchain_calls().is_empty());
    }

    #[test]
    fn gopath_opt_in_appends_ambient_root() {
        let sb = Sandbox::new();
        let spec = sb.spec("hello", "example.com/hello");

        sb.demand()
            .env("GOPATH", "/ambient/go")
            .arg("--build")
            .arg(&spec)
            .assert()
            .success();
        assert!(!sb.toolchain_calls()[0].contains("/ambient/go"));

        sb.demand()
            .env("GOPATH", "/ambient/go")
            .args(["--build", "--gopath"])
            .arg(&spec)
            .assert()
            .success();
        let calls = sb.toolchain_calls();
        assert!(calls[2].contains(":/ambient/go "));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn launched_program_sees_default_sigpipe() {
        let sb = Sandbox::with_program(r#"grep -E "^Sig(Ign|Blk)" /proc/$$/status"#);
        let spec = sb.spec("signals", "example.com/signals");

        let output = sb.demand().arg(&spec).output().unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let mask = |field: &str| {
            let line = stdout
                .lines()
                .find(|l| l.starts_with(field))
                .unwrap_or_else(|| panic!("no {} in {:?}", field, stdout));
            u64::from_str_radix(line[field.len()..].trim(), 16).unwrap()
        };
        // SIGPIPE is signal 13
        assert_eq!(mask("SigIgn:") & (1 << 12), 0);
        assert_eq!(mask("SigBlk:"), 0);
    }

    #[test]
    fn runs_as_shebang_interpreter() {
        let sb = Sandbox::new();
        let script = sb.path().join("tool");
        write_executable(
            &script,
            &format!(
                "#!{}\ngo:\n  import: example.com/tool\n",
                env!("CARGO_BIN_EXE_demand")
            ),
        );

        Command::new(&script)
            .env("DEMAND_CACHE_DIR", sb.cache())
            .env("DEMAND_GO", sb.go())
            .env("DEMAND_CONFIG", sb.path().join("no-config.toml"))
            .arg("--verbose")
            .assert()
            .success()
            .stdout("name=tool args=--verbose\n");
    }

    fn walk_files(dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let Ok(entries) = std::fs::read_dir(dir) else {
            return files;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                files.extend(walk_files(&path));
            } else {
                files.push(path);
            }
        }
        files
    }
}
