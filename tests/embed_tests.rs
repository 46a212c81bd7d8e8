//! Embedder boundary tests, driven by a stand-in compiler script, plus the
//! full pack-then-extract scenario.

mod helpers;

use std::fs;

use helpers::{read_tree, TestEnv};
use regex::Regex;
use sfxpack::commands::extract::{cmd_extract, ExtractArgs};
use sfxpack::commands::pack::{cmd_pack, PackArgs};
use sfxpack::config::Config;
use sfxpack::embed::{self, Attachment, EmbedRequest};
use sfxpack::error::Error;
use sfxpack::logbuf::LogBuffer;
use sfxpack::session::{Phase, Progress};

/// A compiler stand-in that honors the expected CLI shape: it copies the
/// container attachment to `<distpath>/<name>`, which also makes the produced
/// "executable" archive-readable, exactly like a real artifact.
const FAKE_EMBEDDER: &str = r#"#!/bin/sh
container=""
dist=""
name=""
while [ $# -gt 0 ]; do
  case "$1" in
    --add-data)
      case "$2" in
        *packed_files.zip) container="${2%%:*}" ;;
      esac
      shift 2 ;;
    --distpath) dist="$2"; shift 2 ;;
    --name) name="$2"; shift 2 ;;
    *) shift ;;
  esac
done
echo "collecting attachments"
echo "writing stub loader"
cp "$container" "$dist/$name"
echo "build complete"
"#;

const FAILING_EMBEDDER: &str = "#!/bin/sh\necho exploding 1>&2\nexit 3\n";

const LYING_EMBEDDER: &str = "#!/bin/sh\necho all good\nexit 0\n";

fn request_for(env: &TestEnv, container: &std::path::Path) -> EmbedRequest {
    EmbedRequest {
        attachments: vec![
            Attachment::new(container, "packed_files.zip"),
            Attachment::new(&env.image, "logo.png"),
        ],
        output_dir: env._temp_dir.path().to_path_buf(),
        output_name: "bundle".to_string(),
        debug: false,
    }
}

#[test]
fn embedder_logs_stream_in_order_and_artifact_appears() {
    let env = TestEnv::new();
    let a = env.write_src("a.txt", "hi");
    let container = env.build_container(&[a]);
    let tool = env.write_script("fake-embed", FAKE_EMBEDDER);

    let progress = Progress::default();
    let phase = Phase::new(&progress, 0.4, 0.95);
    let mut lines = Vec::new();

    let artifact = embed::run_embedder(
        &tool.to_string_lossy(),
        &request_for(&env, &container),
        &phase,
        |line| lines.push(line),
    )
    .unwrap();

    assert!(artifact.is_file());
    let step = Regex::new(r"^(collecting|writing|build)").unwrap();
    assert!(lines.iter().all(|line| step.is_match(line)));
    assert_eq!(lines.last().map(String::as_str), Some("build complete"));
    // finished embed phase lands at the top of its sub-range
    assert_eq!(progress.percent(), 95);
}

#[test]
fn nonzero_exit_is_a_build_failure() {
    let env = TestEnv::new();
    let a = env.write_src("a.txt", "hi");
    let container = env.build_container(&[a]);
    let tool = env.write_script("failing-embed", FAILING_EMBEDDER);

    let progress = Progress::default();
    let phase = Phase::new(&progress, 0.4, 0.95);

    let result = embed::run_embedder(
        &tool.to_string_lossy(),
        &request_for(&env, &container),
        &phase,
        |_| {},
    );

    match result {
        Err(Error::BuildFailure(detail)) => assert!(detail.contains("code 3")),
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[test]
fn zero_exit_without_artifact_is_still_a_build_failure() {
    let env = TestEnv::new();
    let a = env.write_src("a.txt", "hi");
    let container = env.build_container(&[a]);
    let tool = env.write_script("lying-embed", LYING_EMBEDDER);

    let progress = Progress::default();
    let phase = Phase::new(&progress, 0.4, 0.95);

    let result = embed::run_embedder(
        &tool.to_string_lossy(),
        &request_for(&env, &container),
        &phase,
        |_| {},
    );

    match result {
        Err(Error::BuildFailure(detail)) => assert!(detail.contains("no artifact")),
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[test]
fn preflight_reports_missing_tool() {
    assert!(embed::preflight("sh").is_ok());
    assert!(matches!(
        embed::preflight("sfx-embed-definitely-not-installed"),
        Err(Error::BuildFailure(_))
    ));
}

#[test]
fn pack_then_extract_end_to_end() {
    let env = TestEnv::new();
    let a = env.write_src("a.txt", "hi");
    env.write_src("d/x.txt", "x");
    let tool = env.write_script("fake-embed", FAKE_EMBEDDER);

    let dist = env._temp_dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();

    let config = Config {
        embed_tool: tool.to_string_lossy().into_owned(),
        default_destination: env.out.clone(),
    };
    let log = LogBuffer::new();

    cmd_pack(
        &config,
        PackArgs {
            inputs: vec![a, env.src.join("d")],
            image: env.image.clone(),
            output_dir: dist.clone(),
            name: "bundle".to_string(),
            debug: false,
            force: false,
        },
        &log,
    )
    .unwrap();

    let artifact = dist.join(format!("bundle{}", std::env::consts::EXE_SUFFIX));
    assert!(artifact.is_file());
    assert!(log.snapshot().iter().any(|l| l.contains("build complete")));

    // file-picker mode: re-extract the artifact through the same pipeline
    cmd_extract(
        &config,
        ExtractArgs {
            input: Some(artifact),
            output: Some(env.out.clone()),
            open_when_done: false,
        },
        &log,
    )
    .unwrap();

    assert_eq!(
        read_tree(&env.out),
        vec![
            ("a.txt".to_string(), "hi".to_string()),
            ("d/x.txt".to_string(), "x".to_string()),
        ]
    );
}

#[test]
fn pack_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();
    let a = env.write_src("a.txt", "hi");
    let tool = env.write_script("fake-embed", FAKE_EMBEDDER);

    let dist = env._temp_dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    let artifact = dist.join(format!("bundle{}", std::env::consts::EXE_SUFFIX));
    fs::write(&artifact, "already here").unwrap();

    let config = Config {
        embed_tool: tool.to_string_lossy().into_owned(),
        default_destination: env.out.clone(),
    };
    let log = LogBuffer::new();

    let result = cmd_pack(
        &config,
        PackArgs {
            inputs: vec![a],
            image: env.image.clone(),
            output_dir: dist,
            name: "bundle".to_string(),
            debug: false,
            force: false,
        },
        &log,
    );

    let message = result.unwrap_err().to_string();
    assert!(message.contains("--force"));
    assert_eq!(fs::read_to_string(&artifact).unwrap(), "already here");
}
