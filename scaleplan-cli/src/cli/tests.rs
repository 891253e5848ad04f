//! Unit tests for CLI parsing, study loading and rendering.

use super::commands::{load_study, plan_command};
use super::{
    Cli, CliError, Command, CommandOutput, PlanCommand, SeedPolicyArg, StudySource,
    render_output, run_cli,
};

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rstest::{fixture, rstest};
use scaleplan_core::{PlanError, Preset, SeedPolicy, SpaceError};
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

use scaleplan_test_support::tracing::RecordingLayer;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const SMOKE_STUDY: &str = r#"{
    "seeds": [42],
    "node_counts": [1000],
    "scaling_modes": ["strong"],
    "degrees": [2],
    "exponents": [1.0],
    "algorithms": ["par-polypa"],
    "threads": [1, 2]
}"#;

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn create_study_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

fn plan_args(source: StudySource) -> PlanCommand {
    PlanCommand {
        source,
        executable: "target/release/rust-nlpa".into(),
        timing_wrapper: "/usr/bin/time -av".into(),
        log_root: "logs".into(),
        seed_policy: None,
        report_filtered: false,
    }
}

fn study_source(path: PathBuf) -> StudySource {
    StudySource::File(path)
}

fn render(output: &CommandOutput) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    render_output(output, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

#[rstest]
fn emit_renders_the_smoke_study(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(&temp_dir, "smoke.json", SMOKE_STUDY)?;
    let cli = Cli {
        command: Command::Emit(PlanCommand {
            seed_policy: Some(SeedPolicyArg::Multiplicative),
            ..plan_args(study_source(path))
        }),
    };
    let text = render(&run_cli(cli)?)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "/usr/bin/time -av target/release/rust-nlpa -a par-polypa -s 42 -n 1000 -d 2 \
             -e 1.000000 -t 1 > logs/par-polypa/strong/n1000_d2_s0_e10_42_l0_t1.log 2>&1",
            "/usr/bin/time -av target/release/rust-nlpa -a par-polypa -s 84 -n 1000 -d 2 \
             -e 1.000000 -t 2 > logs/par-polypa/strong/n1000_d2_s0_e10_84_l0_t2.log 2>&1",
        ]
    );
    Ok(())
}

#[rstest]
fn dirs_lists_each_directory_once(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(&temp_dir, "smoke.json", SMOKE_STUDY)?;
    let cli = Cli {
        command: Command::Dirs(PlanCommand {
            log_root: "runs/".into(),
            ..plan_args(study_source(path))
        }),
    };
    let text = render(&run_cli(cli)?)?;
    assert_eq!(text, "runs/par-polypa/strong\n");
    Ok(())
}

#[rstest]
fn presets_are_listed_with_descriptions() -> TestResult {
    let text = render(&run_cli(Cli {
        command: Command::Presets,
    })?)?;
    let names: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(
        names,
        ["par-scaling", "node-scaling", "dyn-sweep", "thread-scaling"]
    );
    Ok(())
}

#[rstest]
#[case::par(Preset::ParScaling, 1, SeedPolicy::SplitMix)]
#[case::node(Preset::NodeScaling, 3, SeedPolicy::NodeModular)]
#[case::dyn_sweep(Preset::DynSweep, 1, SeedPolicy::SplitMix)]
#[case::thread(Preset::ThreadScaling, 1, SeedPolicy::Multiplicative)]
fn preset_sources_load_their_spaces_and_policy(
    #[case] preset: Preset,
    #[case] parts: usize,
    #[case] policy: SeedPolicy,
) {
    let study = load_study(StudySource::Preset(preset)).expect("preset is valid");
    assert_eq!(study.spaces.len(), parts);
    assert_eq!(study.seed_policy, policy);
}

#[rstest]
fn study_files_default_to_splitmix(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(&temp_dir, "smoke.json", SMOKE_STUDY)?;
    let study = load_study(study_source(path))?;
    assert_eq!(study.spaces.len(), 1);
    assert_eq!(study.seed_policy, SeedPolicy::SplitMix);
    Ok(())
}

#[rstest]
fn presets_plan_with_their_historical_seeds() -> TestResult {
    let plan = plan_command(plan_args(StudySource::Preset(Preset::ThreadScaling)))?;
    let run = plan
        .runs()
        .iter()
        .find(|run| run.tuple.threads == 3)
        .ok_or("thread-scaling plans three-thread runs")?;
    assert_eq!(run.tuple.seed, 5_487_697_398 * 3);
    Ok(())
}

#[rstest]
fn explicit_seed_policy_overrides_the_preset() -> TestResult {
    let plan = plan_command(PlanCommand {
        seed_policy: Some(SeedPolicyArg::Multiplicative),
        ..plan_args(StudySource::Preset(Preset::NodeScaling))
    })?;
    let first = plan.runs().first().ok_or("node-scaling plans runs")?;
    assert_eq!(first.tuple.seed, 1_235_345);
    Ok(())
}

#[rstest]
fn unknown_algorithms_abort_the_run(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(
        &temp_dir,
        "bad.json",
        r#"{"seeds": [1], "node_counts": [10], "degrees": [2], "exponents": [1.0],
            "algorithms": ["dyn", "polypa-cpp"]}"#,
    )?;
    let err = run_cli_expecting_error(
        Cli {
            command: Command::Emit(plan_args(study_source(path))),
        },
        "unknown algorithm must fail",
    );
    assert!(matches!(err, CliError::Plan(PlanError::UnknownAlgorithm { .. })));
    assert_eq!(err.code(), Some("PLAN_UNKNOWN_ALGORITHM"));
    Ok(())
}

#[rstest]
fn invalid_axes_surface_as_space_errors(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(
        &temp_dir,
        "zero.json",
        r#"{"seeds": [1], "node_counts": [10], "degrees": [2], "exponents": [1.0],
            "algorithms": ["dyn"], "threads": [0]}"#,
    )?;
    let err = run_cli_expecting_error(
        Cli {
            command: Command::Emit(plan_args(study_source(path))),
        },
        "zero threads must fail",
    );
    assert!(matches!(err, CliError::Space(SpaceError::ZeroThreadCount)));
    assert_eq!(err.code(), Some("SPACE_ZERO_THREAD_COUNT"));
    Ok(())
}

#[rstest]
fn missing_study_files_are_reported(temp_dir: TempDir) {
    let err = run_cli_expecting_error(
        Cli {
            command: Command::Emit(plan_args(study_source(temp_dir.path().join("nope.json")))),
        },
        "missing file must fail",
    );
    assert!(matches!(err, CliError::Study(_)));
    assert_eq!(err.code(), None);
}

#[rstest]
fn report_filtered_logs_dropped_combinations(temp_dir: TempDir) -> TestResult {
    let path = create_study_file(
        &temp_dir,
        "filtered.json",
        r#"{"seeds": [1], "node_counts": [10], "degrees": [1], "exponents": [1.0],
            "simple": [true], "algorithms": ["dyn"]}"#,
    )?;
    let command = PlanCommand {
        report_filtered: true,
        ..plan_args(study_source(path))
    };
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let plan = tracing::subscriber::with_default(subscriber, || plan_command(command))?;
    assert!(plan.runs().is_empty());
    assert_eq!(layer.events_with_message("dropping invalid combination").len(), 1);
    assert!(layer.span("cli.plan").is_some());
    Ok(())
}

#[rstest]
#[case::emit_preset(&["scaleplan", "emit", "--preset", "par-scaling"])]
#[case::dirs_study(&["scaleplan", "dirs", "--study", "study.json", "--log-root", "out"])]
#[case::seed_policy(&["scaleplan", "emit", "--preset", "node-scaling", "--seed-policy", "multiplicative"])]
#[case::node_modular(&["scaleplan", "emit", "--study", "s.json", "--seed-policy", "node-modular"])]
#[case::dyn_sweep(&["scaleplan", "dirs", "--preset", "dyn-sweep"])]
#[case::empty_wrapper(&["scaleplan", "emit", "--preset", "thread-scaling", "--timing-wrapper", ""])]
#[case::presets(&["scaleplan", "presets"])]
fn clap_accepts_valid_invocations(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_ok());
}

#[rstest]
#[case::no_study(&["scaleplan", "emit"])]
#[case::both_studies(&["scaleplan", "emit", "--preset", "par-scaling", "--study", "s.json"])]
#[case::unknown_preset(&["scaleplan", "emit", "--preset", "seq-scaling"])]
#[case::unknown_policy(&["scaleplan", "emit", "--preset", "par-scaling", "--seed-policy", "xor"])]
fn clap_rejects_invalid_invocations(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn clap_defaults_match_the_core_defaults() {
    let cli = Cli::try_parse_from(["scaleplan", "emit", "--preset", "par-scaling"])
        .expect("arguments are valid");
    let Command::Emit(command) = cli.command else {
        panic!("expected the emit command");
    };
    assert_eq!(command.executable, scaleplan_core::DEFAULT_EXECUTABLE);
    assert_eq!(command.timing_wrapper, scaleplan_core::DEFAULT_TIMING_WRAPPER);
    assert_eq!(command.log_root, scaleplan_core::DEFAULT_LOG_ROOT);
    assert_eq!(command.seed_policy, None);
    assert!(!command.report_filtered);
    assert_eq!(command.source, StudySource::Preset(Preset::ParScaling));
}

#[rstest]
fn clap_maps_study_paths_into_the_source() {
    let cli = Cli::try_parse_from(["scaleplan", "dirs", "--study", "study.json"])
        .expect("arguments are valid");
    let Command::Dirs(command) = cli.command else {
        panic!("expected the dirs command");
    };
    assert_eq!(command.source, StudySource::File(PathBuf::from("study.json")));
}
