use serde_yaml::Value;

const WORKFLOW: &str = include_str!("../.github/workflows/daily-scrape.yml");

const SECRETS: [&str; 3] = ["SENDER_EMAIL", "EMAIL_PASSWORD", "RECIPIENT_EMAIL"];

fn workflow() -> Value {
    serde_yaml::from_str(WORKFLOW).expect("workflow must be valid YAML")
}

#[test]
fn test_triggers_daily_and_on_dispatch() {
    let workflow = workflow();
    let on = &workflow["on"];

    let crons: Vec<&str> = on["schedule"]
        .as_sequence()
        .expect("schedule trigger")
        .iter()
        .filter_map(|entry| entry["cron"].as_str())
        .collect();
    assert_eq!(crons, vec!["0 3 * * *"]);

    let on = on.as_mapping().expect("trigger mapping");
    assert!(on.contains_key(&Value::from("workflow_dispatch")));
}

#[test]
fn test_single_job_with_one_secret_bound_run_step() {
    let workflow = workflow();
    let jobs = workflow["jobs"].as_mapping().expect("jobs mapping");
    assert_eq!(jobs.len(), 1);

    let steps = workflow["jobs"]["scrape"]["steps"]
        .as_sequence()
        .expect("scrape steps");
    let secret_steps: Vec<&Value> = steps
        .iter()
        .filter(|step| step.get("env").is_some())
        .collect();
    assert_eq!(secret_steps.len(), 1);

    let step = secret_steps[0];
    let run = step["run"].as_str().expect("execution step runs a command");
    assert!(run.contains("cargo run --release -- run-once"));

    let env = step["env"].as_mapping().expect("env mapping");
    assert_eq!(env.len(), SECRETS.len());
    for name in SECRETS {
        let value = env
            .get(&Value::from(name))
            .and_then(Value::as_str)
            .unwrap_or_default();
        assert_eq!(value, format!("${{{{ secrets.{} }}}}", name));
    }
}

#[test]
fn test_steps_install_dependencies_before_running() {
    let workflow = workflow();
    let steps = workflow["jobs"]["scrape"]["steps"]
        .as_sequence()
        .expect("scrape steps");

    let names: Vec<&str> = steps
        .iter()
        .map(|step| step["name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        names,
        vec![
            "Checkout repository",
            "Set up Rust",
            "Set up Chrome",
            "Fetch dependencies",
            "Run scraper",
        ]
    );

    let fetch = steps[3]["run"].as_str().expect("fetch step runs a command");
    assert!(fetch.starts_with("cargo fetch"));
    if fetch.contains("--locked") {
        let lockfile = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.lock");
        assert!(lockfile.exists(), "--locked fetch needs a committed Cargo.lock");
    }
}
