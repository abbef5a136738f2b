use convkit_settings::{JobFile, SettingsError, ToolTable};
use std::fs;

const JOB: &str = r#"
[setup]
wcs = "G55"
spindle_rpm = 1200
spindle_direction = "cw"
coolant = "mist"
tool = 4
units = "imperial"
xy_feed = 60
z_feed = "4 4/5"
clearance = 0.2
retract = 0.02

[program]
line_numbers = true
start = 100
stride = 5

[[tools]]
number = 4
diameter = "1/4"
description = "1/4 carbide drill"

[[tools]]
number = 7
diameter = 2
description = "2in face mill"

[[operations]]
type = "drill"
holes = [[4, 1], [2, 0]]
z_start = 1
z_end = 0.5

[[operations]]
type = "drill"
z_start = 1
z_end = 0.5
cycle = { kind = "peck", increment = 0.1 }
pattern = { kind = "bolt_circle", num_holes = 4, diameter = 10, center = [0, 0] }

[[operations]]
type = "face"
tool = 7
x_start = 1
x_end = 6
y_start = 1
y_end = -2
z_start = 1
z_end = 0.875
step_over = 1
step_down = "1/8"
"#;

#[test]
fn test_toml_job_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.toml");
    fs::write(&path, JOB).unwrap();

    let job = JobFile::load_from_file(&path).unwrap();
    assert_eq!(job.operations.len(), 3);
    assert_eq!(job.setup.z_feed.unwrap().value(), 4.8);

    let program = job.build_program(&ToolTable::new()).unwrap();
    let text = program.to_text(true);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "N100 G90 G94 G17 G91.1");
    assert_eq!(lines[1], "N105 G20");
    assert_eq!(lines[2], "N110 (Drilling Operation)");
    assert!(text.contains(" G98 G81 R1.020 Z0.500 F4.800\n"));
    assert!(text.contains(" X2.000 Y0.000\n"));
    assert!(text.contains(" (Peck Drilling Operation)\n"));
    assert!(text.contains(" G0 X5.000 Y0.000\n"));
    assert!(text.contains(" G98 G83 R1.020 Z0.500 Q0.100 F4.800\n"));
    assert!(text.contains(" (Facing Operation)\n"));
    assert!(text.contains(" T7 M6 G43\n"));
    assert!(text.contains(" G18 G2 X-0.100 Z0.875 I0.145\n"));
    assert!(text.ends_with(" %"));
}

#[test]
fn test_json_job() {
    let json = r#"{
        "setup": {"wcs": "G54", "spindle_rpm": 800, "tool": 1, "clearance": 1, "z_feed": 3},
        "operations": [
            {"type": "drill", "holes": [[0, 0]], "z_start": 0, "z_end": -0.25,
             "cycle": {"kind": "dwell", "seconds": 0.5}}
        ]
    }"#;
    let job = JobFile::from_json_str(json).unwrap();
    let program = job.build_program(&ToolTable::new()).unwrap();
    let text = program.to_text(false);
    assert!(text.starts_with("G90 G94 G17 G91.1\nG21\n(Dwell Drilling Operation)\n"));
    assert!(text.contains("\nG98 G82 R0.000 Z-0.250 P0.500 F3.000\n"));
}

#[test]
fn test_missing_tool_is_reported_before_generation() {
    let job = JobFile::from_toml_str(
        r#"
[setup]
wcs = "G54"
spindle_rpm = 8000
tool = 3
clearance = 0.5
xy_feed = 30
z_feed = 5

[[operations]]
type = "bore"
center = [0, 0]
diameter = 1
z_start = 0
z_end = -1
"#,
    )
    .unwrap();

    assert!(matches!(
        job.build_program(&ToolTable::new()),
        Err(SettingsError::ToolNotFound(3))
    ));
}

#[test]
fn test_external_tool_table() {
    let dir = tempfile::tempdir().unwrap();
    let tools_path = dir.path().join("tools.toml");
    fs::write(
        &tools_path,
        "[[tools]]\nnumber = 3\ndiameter = 0.5\ndescription = \"1/2 end mill\"\n",
    )
    .unwrap();
    let tools = ToolTable::load_from_file(&tools_path).unwrap();
    assert_eq!(tools.lookup(3).unwrap().description, "1/2 end mill");

    let job = JobFile::from_toml_str(
        r#"
[setup]
wcs = "G54"
spindle_rpm = 8000
tool = 3
clearance = 0.5
retract = 0.1
xy_feed = 30
z_feed = 5

[[operations]]
type = "bore"
center = [0, 0]
diameter = 1
z_start = 0
z_end = -1
ramp_angle = 30
"#,
    )
    .unwrap();
    let program = job.build_program(&tools).unwrap();
    assert!(program.body().contains(&"G3 Z-1.000 I0.250".to_string()));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("part.yaml");
    fs::write(&path, JOB).unwrap();
    assert!(matches!(
        JobFile::load_from_file(&path),
        Err(SettingsError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_generation_errors_surface_from_core() {
    let job = JobFile::from_toml_str(
        r#"
[setup]
wcs = "G54"
spindle_rpm = 8000
tool = 3
clearance = 0.5
xy_feed = 30
z_feed = 5

[[operations]]
type = "pocket"
tool_diameter = 1
center = [0, 0]
diameter = 0.5
z_start = 0
z_end = -1
step_down = 0.1
"#,
    )
    .unwrap();
    let err = job.build_program(&ToolTable::new()).unwrap_err();
    assert_eq!(err.to_string(), "Tool diameter 1 exceeds pocket diameter 0.5");
}
