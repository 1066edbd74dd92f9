use assert_cmd::prelude::*;
use hud_resilience::StatsSnapshot;
use predicates::prelude::*;
use std::process::Command;

mod common;
use common::{assertions, fixtures::*};

fn cli(env: &TestEnv) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("hud-resilience")?;
    cmd.env("NO_COLOR", "1")
        .arg("--config")
        .arg(env.temp_dir.path().join("config.json"))
        .arg("--cache-dir")
        .arg(env.cache_dir());
    Ok(cmd)
}

/// Seed the cache through the library using the real clock, as the host would.
fn seed(env: &TestEnv, table_key: &str, snapshot: &StatsSnapshot) -> anyhow::Result<()> {
    let mut cache = hud_resilience::StatsCache::new(&env.config().cache)?;
    assert!(cache.save(table_key, snapshot));
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_classify_prints_severity_and_policy() -> anyhow::Result<()> {
        let env = TestEnv::new()?;

        cli(&env)?
            .args(["classify", "Connection timeout while parsing", "--text", "Hand #1: ..."])
            .assert()
            .success()
            .stdout(assertions::has_severity("temporary"))
            .stdout(predicate::str::contains("Reset read position: no"))
            .stdout(predicate::str::contains("Retry: yes"));

        cli(&env)?
            .args(["classify", "Invalid format detected", "--text", "garbage"])
            .assert()
            .success()
            .stdout(assertions::has_severity("permanent"))
            .stdout(predicate::str::contains("Reset read position: yes"))
            .stdout(predicate::str::contains("Retry: no"));

        Ok(())
    }

    #[test]
    fn test_inspect_prints_cached_snapshot() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        seed(&env, "T1", &six_max_snapshot("T1"))?;

        cli(&env)?
            .args(["inspect", "T1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"stat_dict\""))
            .stdout(predicate::str::contains("\"alice\""))
            .stdout(predicate::str::contains("\"poker_game\": \"holdem\""));

        Ok(())
    }

    #[test]
    fn test_inspect_missing_table() -> anyhow::Result<()> {
        let env = TestEnv::new()?;

        cli(&env)?
            .args(["inspect", "nowhere"])
            .assert()
            .success()
            .stdout(assertions::no_cached_stats("nowhere"));

        Ok(())
    }

    #[test]
    fn test_list_and_remove() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        seed(&env, "Altair", &six_max_snapshot("Altair"))?;

        cli(&env)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("Altair"))
            .stdout(predicate::str::contains("3 players"))
            .stdout(predicate::str::contains("[fresh]"));

        cli(&env)?
            .args(["remove", "Altair"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed cached stats for table Altair"));
        assert!(!env.cache_dir().join("Altair.json").exists());

        // Removing again is not an error.
        cli(&env)?.args(["remove", "Altair"]).assert().success();

        cli(&env)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached HUD stats"));

        Ok(())
    }

    #[test]
    fn test_sweep_honors_configured_ttl() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        seed(&env, "T1", &six_max_snapshot("T1"))?;
        std::fs::write(
            env.temp_dir.path().join("config.json"),
            r#"{"cache": {"ttl_secs": 0}}"#,
        )?;

        cli(&env)?
            .arg("sweep")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 expired HUD stats cache file(s)"));
        assert!(!env.cache_dir().join("T1.json").exists());

        cli(&env)?
            .arg("sweep")
            .assert()
            .success()
            .stdout(predicate::str::contains("No expired HUD stats to remove"));

        Ok(())
    }

    #[test]
    fn test_unusable_cache_dir_fails() -> anyhow::Result<()> {
        let env = TestEnv::new()?;
        let blocker = env.temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory")?;

        let mut cmd = Command::cargo_bin("hud-resilience")?;
        cmd.env("NO_COLOR", "1")
            .arg("--config")
            .arg(env.temp_dir.path().join("config.json"))
            .arg("--cache-dir")
            .arg(blocker.join("cache"))
            .arg("list")
            .assert()
            .failure()
            .stdout(assertions::is_error())
            .stdout(predicate::str::contains("Failed to create cache directory"));

        Ok(())
    }
}
