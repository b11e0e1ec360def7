use motionkit::{parse_block, Config, Error, LineMove, Runner};
use std::io::Write;
use tempfile::NamedTempFile;

fn run(runner: &mut Runner, program: &str) -> Result<Vec<LineMove>, Error> {
    let mut emitted = Vec::new();
    let mut sink = |line: LineMove| -> std::io::Result<()> {
        emitted.push(line);
        Ok(())
    };
    for text in program.lines() {
        let block = parse_block(text).unwrap();
        runner.execute(&block, &mut sink)?;
    }
    runner.finish(&mut sink)?;
    Ok(emitted)
}

#[test]
fn test_config_file_controls_segmentation() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[arc]\nmin_segment_length = 1.0").unwrap();
    let config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.arc.min_segment_length, 1.0);

    let mut runner = Runner::new(config);
    let lines = run(&mut runner, "F600\nG2 X10 I5").unwrap();

    // the 1mm minimum length is tighter than the chordal tolerance here
    assert_eq!(lines.len(), 15);
    assert_eq!(lines.last().unwrap().target[0], 10.0);
}

#[test]
fn test_soft_limits_stop_program() {
    let mut config = Config::new();
    config.soft_limits.enabled = true;
    let mut runner = Runner::new(config);

    let err = run(&mut runner, "F600\nG0 X5 Y5\nG3 X-5 Y5 I-5").unwrap_err();
    assert!(err.is_soft_limit());
    assert_eq!(runner.machine().position()[..2], [5.0, 5.0]);
}

#[test]
fn test_radius_program_with_helix() {
    let mut runner = Runner::new(Config::new());
    let program = "G17 G21 F900\nG0 X10 Y10 Z0\nG2 X20 Y10 Z-2 R5";
    let lines = run(&mut runner, program).unwrap();

    let last = lines.last().unwrap();
    assert_eq!(last.target[..3], [20.0, 10.0, -2.0]);
    let z: Vec<f64> = lines.iter().skip(1).map(|line| line.target[2]).collect();
    assert!(z.windows(2).all(|pair| pair[1] < pair[0]));
}

#[test]
fn test_unreadable_extension_rejected() {
    let file = NamedTempFile::new().unwrap();
    assert!(Config::load_from_file(file.path()).is_err());
}
