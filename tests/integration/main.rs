//! Integration tests for Kiln

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    const UPPER_CONFIG: &str = r#"
[[compilers]]
name = "upper"
version = "1"
command = "tr"
args = ["a-z", "A-Z"]
extensions = ["up"]
bypass_pragma = "// no-cache"
"#;

    fn kiln() -> Command {
        cargo_bin_cmd!("kiln")
    }

    /// Command isolated from the user's config and cache
    fn kiln_in(temp: &Path) -> Command {
        let config = temp.join("config.toml");
        if !config.exists() {
            std::fs::write(&config, UPPER_CONFIG).unwrap();
        }
        let mut cmd = kiln();
        cmd.arg("--config")
            .arg(&config)
            .arg("--no-local")
            .arg("--cache-dir")
            .arg(temp.join("cache"));
        cmd
    }

    #[test]
    fn help_displays() {
        kiln()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed compilation cache"));
    }

    #[test]
    fn version_displays() {
        kiln()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("kiln"));
    }

    #[test]
    fn compile_reuses_cached_output() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("hello.up");
        std::fs::write(&src, "abc").unwrap();

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .arg("--stats")
            .assert()
            .success()
            .stdout("ABC")
            .stderr(predicate::str::contains("hits: 0, misses: 1"));

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .arg("--stats")
            .assert()
            .success()
            .stdout("ABC")
            .stderr(predicate::str::contains("hits: 1, misses: 0"));
    }

    #[test]
    fn compile_serves_tampered_entry() {
        // A hit returns stored bytes without re-running the compiler
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("hello.up");
        std::fs::write(&src, "abc").unwrap();

        let output = kiln_in(temp.path())
            .arg("locate")
            .arg(&src)
            .assert()
            .success()
            .stderr(predicate::str::contains("not cached"))
            .get_output()
            .stdout
            .clone();
        let entry = String::from_utf8(output).unwrap().trim().to_string();
        assert!(entry.ends_with("a9993e364706816aba3e25717850c26c9cd0d89d.js"));

        kiln_in(temp.path()).arg("compile").arg(&src).assert().success();
        std::fs::write(&entry, "stale").unwrap();

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .assert()
            .success()
            .stdout("stale");
    }

    #[test]
    fn compile_bypass_pragma_skips_cache() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("raw.up");
        std::fs::write(&src, "// no-cache\nabc").unwrap();

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .arg("--stats")
            .assert()
            .success()
            .stdout("// NO-CACHE\nABC")
            .stderr(predicate::str::contains("hits: 0, misses: 0"));

        kiln_in(temp.path())
            .arg("locate")
            .arg(&src)
            .assert()
            .success()
            .stderr(predicate::str::contains("bypasses the cache"));
    }

    #[test]
    fn compile_writes_out_dir() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("notes.up");
        std::fs::write(&src, "hi").unwrap();
        let out = temp.path().join("dist");

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .arg("--out-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout("");

        assert_eq!(std::fs::read_to_string(out.join("notes.js")).unwrap(), "HI");
    }

    #[test]
    fn compile_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("main.coffee");
        std::fs::write(&src, "x = 1").unwrap();

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No compiler registered for extension: .coffee"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn compile_failure_reports_compiler_error() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            r#"
[[compilers]]
name = "broken"
command = "sh"
args = ["-c", "echo boom >&2; exit 3"]
extensions = ["bad"]
"#,
        )
        .unwrap();
        let src = temp.path().join("x.bad");
        std::fs::write(&src, "x").unwrap();

        kiln_in(temp.path())
            .arg("compile")
            .arg(&src)
            .assert()
            .failure()
            .stderr(predicate::str::contains("boom"));
    }

    #[test]
    fn digest_json_from_stdin() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["digest", "json", "-"])
            .write_stdin(r#"{"b": 2, "a": 1}"#)
            .assert()
            .success()
            .stdout("5375a47b9f8e7ad0225611b486fe92ce26f2c0a5\n");
    }

    #[test]
    fn digest_json_canonical() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["digest", "json", "-", "--canonical"])
            .write_stdin(r#"{"name": "demo", "version": 1}"#)
            .assert()
            .success()
            .stdout(r#"{"name": "demo","version": 1,}"#);
    }

    #[test]
    fn digest_json_escaped_scheme() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["digest", "--scheme", "escaped", "json", "-"])
            .write_stdin("{}")
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap());
    }

    #[test]
    fn digest_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.up");
        std::fs::write(&src, "abc").unwrap();

        kiln_in(temp.path())
            .args(["digest", "source"])
            .arg(&src)
            .assert()
            .success()
            .stdout("a9993e364706816aba3e25717850c26c9cd0d89d\n");
    }

    #[test]
    fn digest_identity_lists_compilers() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["digest", "identity"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{40}  upper\n$").unwrap());

        kiln_in(temp.path())
            .args(["digest", "identity", "--compiler", "coffee"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No compiler named 'coffee'"));
    }

    #[test]
    fn info_runs() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .arg("info")
            .env("CI", "true")
            .assert()
            .success()
            .stdout(predicate::str::contains("upper"))
            .stdout(predicate::str::contains(".up"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["config", "set", "cache.scheme", "escaped"])
            .env("CI", "true")
            .assert()
            .success();

        kiln_in(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"scheme = "escaped""#))
            .stdout(predicate::str::contains(r#"name = "upper""#));
    }

    #[test]
    fn config_set_unknown_key() {
        let temp = TempDir::new().unwrap();
        kiln_in(temp.path())
            .args(["config", "set", "cache.size", "10"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn local_config_overrides_global() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        std::fs::create_dir_all(project.join("src")).unwrap();
        std::fs::write(
            project.join(".kiln.toml"),
            "[cache]\nscheme = \"escaped\"\n",
        )
        .unwrap();
        let global = temp.path().join("global.toml");
        std::fs::write(&global, UPPER_CONFIG).unwrap();

        kiln()
            .current_dir(project.join("src"))
            .arg("--config")
            .arg(&global)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"scheme = "escaped""#))
            .stdout(predicate::str::contains(r#"name = "upper""#));
    }
}

mod cache_tests {
    use async_trait::async_trait;
    use kiln::{CacheStats, CompileCache, CompilerStrategy, DigestScheme, KilnResult};
    use serde_json::{json, Value};
    use std::path::Path;
    use tempfile::TempDir;

    struct Demo;

    #[async_trait]
    impl CompilerStrategy for Demo {
        fn identity(&self) -> Value {
            json!({"name": "demo", "version": 1})
        }

        async fn compile(&self, source: &str, _source_path: &Path) -> KilnResult<Vec<u8>> {
            Ok(source.to_uppercase().into_bytes())
        }
    }

    #[tokio::test]
    async fn hits_and_misses_end_to_end() {
        let temp = TempDir::new().unwrap();
        let cache = CompileCache::new(Box::new(Demo), temp.path());
        let path = Path::new("demo.src");

        assert_eq!(cache.resolve("abc", path).await.unwrap(), b"ABC");
        assert_eq!(cache.resolve("abc", path).await.unwrap(), b"ABC");
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        let entry = temp
            .path()
            .join("f1d5d0d9fbdc5deec5719fe660f6655dbf5a6f5d")
            .join("a9993e364706816aba3e25717850c26c9cd0d89d.js");
        assert_eq!(std::fs::read(&entry).unwrap(), b"ABC");

        assert_eq!(cache.resolve("xyz", path).await.unwrap(), b"XYZ");
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[tokio::test]
    async fn schemes_use_separate_directories() {
        let temp = TempDir::new().unwrap();
        let legacy = CompileCache::new(Box::new(Demo), temp.path());
        let escaped =
            CompileCache::new(Box::new(Demo), temp.path()).with_scheme(DigestScheme::Escaped);

        legacy.resolve("abc", Path::new("a")).await.unwrap();
        escaped.resolve("abc", Path::new("a")).await.unwrap();

        assert_eq!(escaped.stats(), CacheStats { hits: 0, misses: 1 });
        let dirs = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(dirs, 2);
    }
}
