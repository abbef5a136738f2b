use convkit::{default_output_path, render, run, RunOptions};
use std::fs;
use std::path::Path;

const JOB: &str = r#"
[setup]
wcs = "G55"
spindle_rpm = 1200
tool = 4
clearance = 0.2
retract = 0.02
z_feed = 4.8

[[operations]]
type = "drill"
holes = [[4, 1]]
z_start = 1
z_end = 0.5
"#;

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let job = dir.join("plate.toml");
    let tools = dir.join("tools.toml");
    fs::write(&job, JOB).unwrap();
    fs::write(&tools, "[[tools]]\nnumber = 4\ndiameter = 0.25\n").unwrap();
    (job, tools)
}

#[test]
fn test_default_output_path() {
    assert_eq!(
        default_output_path(Path::new("jobs/plate.toml")),
        Path::new("jobs/plate.ngc")
    );
}

#[test]
fn test_run_writes_numbered_program() {
    let dir = tempfile::tempdir().unwrap();
    let (job, tools) = write_inputs(dir.path());

    let written = run(&RunOptions {
        job: job.clone(),
        tools: Some(tools),
        ..Default::default()
    })
    .unwrap()
    .unwrap();
    assert_eq!(written, default_output_path(&job));

    let text = fs::read_to_string(written).unwrap();
    assert_eq!(
        text,
        "N10 G90 G94 G17 G91.1\n\
         N20 G21\n\
         N30 (Drilling Operation)\n\
         N40 T4 M6 G43\n\
         N50 S1200.000\n\
         N60 M3\n\
         N70 G55\n\
         N80 G0 X4.000 Y1.000\n\
         N90 G98 G81 R1.020 Z0.500 F4.800\n\
         N100 G80\n\
         N110 G0 Z0.200\n\
         N120 G53 G0 Z0\n\
         N130 M30\n\
         N140 %\n"
    );
}

#[test]
fn test_line_numbers_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let (job, tools) = write_inputs(dir.path());

    let text = render(&RunOptions {
        job,
        tools: Some(tools),
        no_line_numbers: true,
        ..Default::default()
    })
    .unwrap();
    assert!(text.starts_with("G90 G94 G17 G91.1\nG21\n(Drilling Operation)\n"));
    assert!(!text.contains("N10"));
}

#[test]
fn test_missing_job_reports_path() {
    let err = render(&RunOptions {
        job: "does/not/exist.toml".into(),
        ..Default::default()
    })
    .unwrap_err();
    assert!(err.to_string().contains("does/not/exist.toml"));
}

#[test]
fn test_run_honours_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let (job, tools) = write_inputs(dir.path());
    let output = dir.path().join("out").with_extension("nc");

    let written = run(&RunOptions {
        job,
        output: Some(output.clone()),
        tools: Some(tools),
        no_line_numbers: true,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(written, Some(output.clone()));

    let text = fs::read_to_string(output).unwrap();
    assert!(text.starts_with("G90 G94 G17 G91.1\nG21\n"));
    assert!(text.ends_with("G53 G0 Z0\nM30\n%\n"));
}
