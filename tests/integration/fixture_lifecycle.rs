use crate::common::{TestEnv, TEMPLATE_NAME};
use cchfix::{Fixture, FixtureSpec, FixtureState, CONTAINER_NAME};
use regex::Regex;
use serial_test::serial;
use std::fs;

fn fixture(env: &TestEnv) -> Fixture {
    Fixture::new(
        FixtureSpec::new("1.2.3")
            .with_docker(env.docker())
            .with_template(TEMPLATE_NAME),
    )
}

#[test]
#[serial]
fn test_start_exposes_address_and_rendered_config() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);

    fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap();

    let addr_re = Regex::new(r"^[\w.\-]+:\d{1,5}$").unwrap();
    assert!(addr_re.is_match(fixture.address()), "bad address {}", fixture.address());
    assert_eq!(fixture.container(), CONTAINER_NAME);
    assert_eq!(fixture.state(), FixtureState::Running);

    let scratch = fixture.scratch_dir().unwrap().to_path_buf();
    let entries: Vec<_> = fs::read_dir(&scratch).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let config = fs::read_to_string(scratch.join("carbon-clickhouse.conf")).unwrap();
    assert!(config.contains(fixture.address()));
    assert!(config.contains("ch:8123"));

    fixture.stop(true).unwrap();
}

#[test]
#[serial]
fn test_launch_arguments() {
    let env = TestEnv::new();
    let mut fixture = Fixture::new(
        FixtureSpec::new("1.2.3")
            .with_docker(env.docker())
            .with_template(TEMPLATE_NAME)
            .with_tz("Europe/Moscow"),
    );

    let out = fixture
        .start(&env.test_dir, "http://clickhouse:8123", "clickhouse-server-gch-test")
        .unwrap();
    assert_eq!(out, "0123456789abcdef\n");

    let scratch = fixture.scratch_dir().unwrap().display().to_string();
    let expected = format!(
        "run -d --name {} -p {}:2003 -v {}:/etc/carbon-clickhouse --link clickhouse-server-gch-test -e TZ=Europe/Moscow lomik/carbon-clickhouse:1.2.3",
        CONTAINER_NAME,
        fixture.address(),
        scratch
    );
    assert_eq!(env.calls(), vec![expected]);

    fixture.stop(true).unwrap();
}

#[test]
#[serial]
fn test_delete_removes_container_and_scratch_dir() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);
    fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap();
    let scratch = fixture.scratch_dir().unwrap().to_path_buf();

    let out = fixture.delete().unwrap();
    assert_eq!(out, format!("{}\n", CONTAINER_NAME));
    assert_eq!(fixture.container(), "");
    assert_eq!(fixture.state(), FixtureState::Deleted);
    assert!(!scratch.exists());

    // Deleted is terminal: further teardown is a no-op
    assert_eq!(fixture.stop(true).unwrap(), "");
    assert_eq!(fixture.delete().unwrap(), "");
    assert_eq!(env.subcommands(), vec!["run", "rm"]);
}

#[test]
#[serial]
fn test_stop_then_delete() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);
    fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap();

    fixture.stop(false).unwrap();
    assert_eq!(fixture.state(), FixtureState::Stopped);
    assert_eq!(fixture.container(), CONTAINER_NAME);
    assert!(fixture.scratch_dir().unwrap().exists());

    fixture.delete().unwrap();
    assert_eq!(fixture.container(), "");
    assert_eq!(env.subcommands(), vec!["run", "stop", "rm"]);
}

#[test]
#[serial]
fn test_teardown_before_start_runs_nothing() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);

    assert_eq!(fixture.stop(true).unwrap(), "");
    assert_eq!(fixture.delete().unwrap(), "");
    fixture.cleanup();
    fixture.cleanup();
    assert!(env.calls().is_empty());
}
