use crate::common::{TestEnv, TEMPLATE_NAME};
use cchfix::{Fixture, FixtureError, FixtureSpec, FixtureState, CONTAINER_NAME};
use serial_test::serial;

fn fixture(env: &TestEnv) -> Fixture {
    Fixture::new(
        FixtureSpec::new("1.2.3")
            .with_docker(env.docker())
            .with_template(TEMPLATE_NAME),
    )
}

#[test]
#[serial]
fn test_undefined_template_parameter() {
    let env = TestEnv::new();
    env.write_template(TEMPLATE_NAME, "listen = \"{{.CCH_LISTEN}}\"\n");
    let mut fixture = fixture(&env);

    let err = fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap_err();

    assert!(matches!(err, FixtureError::TemplateRender { .. }));
    assert!(err.is_pre_launch());
    assert!(fixture.scratch_dir().is_none());
    assert_eq!(fixture.container(), "");
    assert!(env.calls().is_empty());
}

#[test]
#[serial]
fn test_template_syntax_error() {
    let env = TestEnv::new();
    env.write_template(TEMPLATE_NAME, "listen = \"{% if %}\"\n");
    let mut fixture = fixture(&env);

    let err = fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap_err();

    assert!(matches!(err, FixtureError::TemplateParse { .. }));
    assert!(err.to_string().contains("parse"));
    assert!(env.calls().is_empty());
}

#[test]
#[serial]
fn test_missing_version() {
    let env = TestEnv::new();
    let mut fixture = Fixture::new(FixtureSpec::default().with_docker(env.docker()));

    let err = fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap_err();

    assert!(matches!(err, FixtureError::Validation(_)));
    assert_eq!(fixture.address(), "");
    assert!(env.calls().is_empty());
}

#[test]
#[serial]
fn test_launch_failure_preserves_config() {
    let env = TestEnv::new();
    env.fail(
        "run",
        "docker: Error response from daemon: Conflict. The container name \"/carbon-clickhouse-gch-test\" is already in use.\n",
    );
    let mut fixture = fixture(&env);

    let err = fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap_err();

    assert!(!err.is_pre_launch());
    assert!(err.output().contains("already in use"));
    assert_eq!(fixture.state(), FixtureState::LaunchFailed);

    let config = fixture.config_file().unwrap();
    let rendered = std::fs::read_to_string(&config).unwrap();
    assert!(rendered.contains(fixture.address()));

    // Teardown still reaches the runtime and then releases the directory
    fixture.delete().unwrap();
    assert!(!config.exists());
}

#[test]
#[serial]
fn test_missing_runtime_binary() {
    let env = TestEnv::new();
    let mut fixture = Fixture::new(
        FixtureSpec::new("1.2.3")
            .with_docker(env.bin_dir.join("no-such-docker").to_string_lossy().to_string())
            .with_template(TEMPLATE_NAME),
    );

    let err = fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap_err();

    assert!(matches!(err, FixtureError::RuntimeSpawn { .. }));
    assert_eq!(fixture.container(), "");
    assert!(fixture.scratch_dir().unwrap().exists());
    fixture.cleanup();
}

#[test]
#[serial]
fn test_failed_stop_keeps_container() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);
    fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap();

    env.fail("stop", "Error response from daemon: cannot stop container\n");
    let err = fixture.stop(true).unwrap_err();

    assert!(err.output().contains("cannot stop container"));
    assert_eq!(fixture.container(), CONTAINER_NAME);
    assert_eq!(env.subcommands(), vec!["run", "stop"]);

    env.recover("stop");
    fixture.stop(true).unwrap();
    assert_eq!(fixture.container(), "");
}

#[test]
#[serial]
fn test_failed_delete_allows_retry() {
    let env = TestEnv::new();
    let mut fixture = fixture(&env);
    fixture
        .start(&env.test_dir, "ch:8123", "ch-container")
        .unwrap();
    let scratch = fixture.scratch_dir().unwrap().to_path_buf();

    env.fail("rm", "Error response from daemon: removal in progress\n");
    assert!(fixture.delete().is_err());
    assert_eq!(fixture.container(), CONTAINER_NAME);
    assert!(!scratch.exists());

    env.recover("rm");
    fixture.delete().unwrap();
    assert_eq!(fixture.container(), "");
}
