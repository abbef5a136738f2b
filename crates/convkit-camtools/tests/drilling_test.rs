use convkit_camtools::{
    CamToolError, CoolantMode, DrillCycle, DrillingGenerator, DrillingOperation, MachineSetup,
    OperationGenerator, SpindleDirection, WorkOffset,
};
use convkit_core::Point;

fn setup(rpm: f64) -> MachineSetup {
    MachineSetup::builder()
        .tool_number(4)
        .spindle_rpm(rpm)
        .wcs(WorkOffset::G55)
        .clearance(0.2)
        .retract(0.02)
        .build()
        .unwrap()
}

fn drill(holes: Vec<Point>, cycle: DrillCycle) -> DrillingOperation {
    DrillingOperation {
        holes,
        z_start: 1.0,
        z_end: 0.5,
        retract: 0.02,
        feed: 4.8,
        cycle,
    }
}

fn one_hole() -> Vec<Point> {
    vec![Point::new(4.0, 1.0)]
}

#[test]
fn test_drill_single_hole() {
    let generator = DrillingGenerator::new(setup(1200.0), drill(one_hole(), DrillCycle::Drill));
    assert_eq!(generator.name(), "Drilling Operation");
    assert_eq!(
        generator.generate().unwrap(),
        vec![
            "T4 M6 G43",
            "S1200.000",
            "M3",
            "G55",
            "G0 X4.000 Y1.000",
            "G98 G81 R1.020 Z0.500 F4.800",
            "G80",
            "G0 Z0.200",
        ]
    );
}

#[test]
fn test_drill_multiple_holes_keeps_order() {
    let holes = vec![
        Point::new(4.0, 1.0),
        Point::new(2.0, 0.0),
        Point::new(3.2, -10.01),
    ];
    let gcode = DrillingGenerator::new(setup(1200.0), drill(holes, DrillCycle::Drill))
        .generate()
        .unwrap();
    assert_eq!(
        &gcode[4..9],
        &[
            "G0 X4.000 Y1.000",
            "G98 G81 R1.020 Z0.500 F4.800",
            "X2.000 Y0.000",
            "X3.200 Y-10.010",
            "G80",
        ]
    );
}

#[test]
fn test_empty_hole_list_with_mist() {
    let mut s = setup(1200.0);
    s.coolant = CoolantMode::Mist;
    let gcode = DrillingGenerator::new(s, drill(vec![], DrillCycle::Drill))
        .generate()
        .unwrap();
    assert_eq!(
        gcode,
        vec!["T4 M6 G43", "S1200.000", "M3", "G55", "M7", "G80", "M9", "G0 Z0.200"]
    );
}

#[test]
fn test_flood_coolant() {
    let mut s = setup(1200.0);
    s.coolant = "FLOOD".parse().unwrap();
    let gcode = DrillingGenerator::new(s, drill(one_hole(), DrillCycle::Drill))
        .generate()
        .unwrap();
    assert_eq!(gcode[4], "M8");
    assert_eq!(&gcode[gcode.len() - 2..], &["M9", "G0 Z0.200"]);
}

#[test]
fn test_dwell_cycle() {
    let generator = DrillingGenerator::new(
        setup(1200.0),
        drill(one_hole(), DrillCycle::Dwell { seconds: 0.5 }),
    );
    assert_eq!(generator.name(), "Dwell Drilling Operation");
    assert_eq!(
        generator.generate().unwrap()[5],
        "G98 G82 R1.020 Z0.500 P0.500 F4.800"
    );
}

#[test]
fn test_peck_cycle() {
    let gcode = DrillingGenerator::new(
        setup(1200.0),
        drill(one_hole(), DrillCycle::Peck { increment: 0.1 }),
    )
    .generate()
    .unwrap();
    assert_eq!(gcode[5], "G98 G83 R1.020 Z0.500 Q0.100 F4.800");
}

#[test]
fn test_chip_break_cycle() {
    let gcode = DrillingGenerator::new(
        setup(1200.0),
        drill(one_hole(), DrillCycle::ChipBreak { increment: 0.05 }),
    )
    .generate()
    .unwrap();
    assert_eq!(gcode[5], "G98 G73 R1.020 Z0.500 Q0.050 F4.800");
}

#[test]
fn test_right_hand_tap() {
    let generator = DrillingGenerator::new(
        setup(120.0),
        drill(one_hole(), DrillCycle::Tap { pitch: 0.05 }),
    );
    assert_eq!(generator.name(), "Right Hand Tap Operation (pitch=0.050)");
    let gcode = generator.generate().unwrap();
    assert_eq!(gcode[1], "S120.000");
    assert_eq!(gcode[2], "M3");
    assert_eq!(gcode[5], "G98 G84 R1.020 Z0.500 F6.000 S120.000");
}

#[test]
fn test_left_hand_tap() {
    let mut s = setup(120.0);
    s.spindle_direction = SpindleDirection::Ccw;
    let generator = DrillingGenerator::new(s, drill(one_hole(), DrillCycle::Tap { pitch: 0.05 }));
    assert_eq!(generator.name(), "Left Hand Tap Operation (pitch=0.050)");
    let gcode = generator.generate().unwrap();
    assert_eq!(gcode[2], "M4");
    assert_eq!(gcode[5], "G98 G74 R1.020 Z0.500 F6.000 S120.000");
}

#[test]
fn test_rigid_tap_visits_each_hole() {
    let holes = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
    let gcode = DrillingGenerator::new(setup(300.0), drill(holes, DrillCycle::RigidTap { pitch: 0.05 }))
        .generate()
        .unwrap();
    assert_eq!(
        &gcode[4..11],
        &[
            "G0 X0.000 Y0.000",
            "G0 Z1.020",
            "G33.1 Z0.500 K0.050",
            "G0 X1.000 Y0.000",
            "G0 Z1.020",
            "G33.1 Z0.500 K0.050",
            "G80",
        ]
    );
}

#[test]
fn test_tap_without_spindle_speed_is_rejected() {
    let result = DrillingGenerator::new(setup(0.0), drill(one_hole(), DrillCycle::Tap { pitch: 0.05 }))
        .generate();
    assert!(matches!(result, Err(CamToolError::InvalidParameter { .. })));
}

#[test]
fn test_zero_feed_is_rejected() {
    let mut op = drill(one_hole(), DrillCycle::Drill);
    op.feed = 0.0;
    assert!(DrillingGenerator::new(setup(1200.0), op).generate().is_err());
}
