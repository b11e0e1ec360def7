//! G-code block reader
//!
//! Reads the subset of G-code the motion core executes: motion modes
//! G0-G3, plane selection G17-G19, units G20/G21, feed rate modes G93/G94
//! and the X Y Z A B C I J K R F N words. Comments are stripped. M, S, T
//! and O words are accepted and ignored.

use motionkit_core::{Axis, MotionMode, Plane, Units, AXES};
use motionkit_planner::LineMove;
use regex::Regex;
use std::fmt::Write;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A G code outside the supported set
    #[error("Unsupported G-code G{0}")]
    UnsupportedGcode(String),

    /// A word letter with no meaning here
    #[error("Unknown word '{0}'")]
    UnknownWord(char),

    /// Text that is not a word
    #[error("Unexpected text '{0}'")]
    UnexpectedText(String),

    /// Word value out of range
    #[error("Invalid value {value} for word {letter}")]
    InvalidValue {
        /// Word letter
        letter: char,
        /// Offending value
        value: String,
    },
}

/// One parsed line of G-code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// N word
    pub line_number: Option<u32>,
    /// Motion mode set by G0-G3
    pub motion_mode: Option<MotionMode>,
    /// Plane set by G17-G19
    pub plane: Option<Plane>,
    /// Units set by G20/G21
    pub units: Option<Units>,
    /// Inverse time mode set by G93/G94
    pub inverse_time: Option<bool>,
    /// Axis words, in the active units
    pub axes: [Option<f64>; AXES],
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub k: Option<f64>,
    pub r: Option<f64>,
    pub f: Option<f64>,
}

impl Block {
    /// Whether any axis word is present
    pub fn has_axis_words(&self) -> bool {
        self.axes.iter().any(Option::is_some)
    }
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*\)|;.*").expect("invalid regex pattern"))
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

/// Parse one line of G-code into a block
pub fn parse_block(line: &str) -> Result<Block, ParseError> {
    let cleaned = comment_regex().replace_all(line, "");
    let words = word_regex();

    let leftover = words.replace_all(&cleaned, "");
    let leftover = leftover.trim();
    if !leftover.is_empty() {
        return Err(ParseError::UnexpectedText(leftover.to_string()));
    }

    let mut block = Block::default();
    for caps in words.captures_iter(&cleaned) {
        let letter = caps[1].chars().next().unwrap_or(' ').to_ascii_uppercase();
        let text = &caps[2];
        let value: f64 = text.parse().map_err(|_| ParseError::InvalidValue {
            letter,
            value: text.to_string(),
        })?;

        match letter {
            'G' => apply_gcode(&mut block, text)?,
            'N' => block.line_number = Some(to_line_number(value, text)?),
            'I' => block.i = Some(value),
            'J' => block.j = Some(value),
            'K' => block.k = Some(value),
            'R' => block.r = Some(value),
            'F' => block.f = Some(value),
            'M' | 'S' | 'T' | 'O' => debug!("Ignoring word {}{}", letter, text),
            _ => match Axis::from_letter(letter) {
                Some(axis) => block.axes[axis.index()] = Some(value),
                None => return Err(ParseError::UnknownWord(letter)),
            },
        }
    }
    Ok(block)
}

fn to_line_number(value: f64, text: &str) -> Result<u32, ParseError> {
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ParseError::InvalidValue {
            letter: 'N',
            value: text.to_string(),
        });
    }
    Ok(value as u32)
}

fn apply_gcode(block: &mut Block, text: &str) -> Result<(), ParseError> {
    let code: u8 = text
        .parse()
        .map_err(|_| ParseError::UnsupportedGcode(text.to_string()))?;

    if let Some(mode) = MotionMode::from_gcode(code) {
        block.motion_mode = Some(mode);
    } else if let Some(plane) = Plane::from_gcode(code) {
        block.plane = Some(plane);
    } else if let Some(units) = Units::from_gcode(code) {
        block.units = Some(units);
    } else {
        match code {
            93 => block.inverse_time = Some(true),
            94 => block.inverse_time = Some(false),
            // absolute distance mode is the only one supported
            90 => {}
            _ => return Err(ParseError::UnsupportedGcode(text.to_string())),
        }
    }
    Ok(())
}

/// Format a planned move as a G1 line in millimeters
pub fn format_move(line: &LineMove) -> String {
    let mut out = String::from("G1");
    for axis in Axis::ALL {
        let value = line.target[axis.index()];
        if axis.is_linear() || value != 0.0 {
            let _ = write!(out, " {}{:.4}", axis, value);
        }
    }
    let _ = write!(out, " ; N{} t={:.6}min", line.line_number, line.move_time);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arc_block() {
        let block = parse_block("N10 G2 X10 Y0 I5.0 J0 F600 (half circle)").unwrap();
        assert_eq!(block.line_number, Some(10));
        assert_eq!(block.motion_mode, Some(MotionMode::ClockwiseArc));
        assert_eq!(block.axes[0], Some(10.0));
        assert_eq!(block.axes[1], Some(0.0));
        assert_eq!(block.axes[2], None);
        assert_eq!(block.i, Some(5.0));
        assert_eq!(block.f, Some(600.0));
        assert!(block.has_axis_words());
    }

    #[test]
    fn test_parse_modal_codes() {
        let block = parse_block("g18 g20 g93").unwrap();
        assert_eq!(block.plane, Some(Plane::XZ));
        assert_eq!(block.units, Some(Units::Inches));
        assert_eq!(block.inverse_time, Some(true));
        assert!(!block.has_axis_words());
    }

    #[test]
    fn test_parse_compact_words() {
        let block = parse_block("G03X-1.5Y.25R-2").unwrap();
        assert_eq!(block.motion_mode, Some(MotionMode::CounterClockwiseArc));
        assert_eq!(block.axes[0], Some(-1.5));
        assert_eq!(block.axes[1], Some(0.25));
        assert_eq!(block.r, Some(-2.0));
    }

    #[test]
    fn test_comments_and_ignored_words() {
        let block = parse_block("M3 S1000 ; spindle on").unwrap();
        assert_eq!(block, Block::default());
        assert_eq!(parse_block("(only a comment)").unwrap(), Block::default());
    }

    #[test]
    fn test_rejects_unsupported() {
        assert_eq!(
            parse_block("G91 X1"),
            Err(ParseError::UnsupportedGcode("91".to_string()))
        );
        assert_eq!(parse_block("Q5"), Err(ParseError::UnknownWord('Q')));
        assert!(matches!(
            parse_block("G1 X1 hello"),
            Err(ParseError::UnexpectedText(_))
        ));
        assert!(parse_block("N-4").is_err());
    }

    #[test]
    fn test_format_move() {
        let line = LineMove {
            target: [1.0, 2.5, -0.125, 90.0, 0.0, 0.0],
            move_time: 0.001,
            feed_rate: 600.0,
            inverse_feed_rate_mode: false,
            motion_mode: MotionMode::ClockwiseArc,
            line_number: 7,
        };
        assert_eq!(
            format_move(&line),
            "G1 X1.0000 Y2.5000 Z-0.1250 A90.0000 ; N7 t=0.001000min"
        );
    }
}
