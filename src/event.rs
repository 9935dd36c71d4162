//! Operator input: events, the pull-based source trait, and a scripted
//! source for headless sessions.

use std::collections::VecDeque;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use image::RgbaImage;
use kurbo::Point;

use crate::error::LassoError;

/// Pointer buttons the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Commit a point.
    Left,
    /// Undo the last point.
    Right,
}

/// Single-key commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    Confirm,
    Quit,
}

impl Key {
    /// Key binding: `e`/`q` zoom, `w`/`a`/`s`/`d` pan, Enter confirms,
    /// Esc quits.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "e" => Some(Key::ZoomIn),
            "q" => Some(Key::ZoomOut),
            "a" => Some(Key::PanLeft),
            "d" => Some(Key::PanRight),
            "w" => Some(Key::PanUp),
            "s" => Some(Key::PanDown),
            "enter" | "return" => Some(Key::Confirm),
            "esc" | "escape" => Some(Key::Quit),
            _ => None,
        }
    }
}

/// One input event. Positions are frame (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Point),
    PointerReleased {
        button: PointerButton,
        position: Point,
    },
    Key(Key),
}

impl FromStr for InputEvent {
    type Err = String;

    /// `move X Y`, `click X Y`, `undo X Y` (or `right X Y`), `key K`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or("empty event")?;
        let args: Vec<&str> = words.collect();
        let position = || -> Result<Point, String> {
            match args.as_slice() {
                [x, y] => {
                    let x = x.parse::<f64>().map_err(|e| format!("bad x {x:?}: {e}"))?;
                    let y = y.parse::<f64>().map_err(|e| format!("bad y {y:?}: {e}"))?;
                    Ok(Point::new(x, y))
                }
                _ => Err(format!("`{verb}` takes two coordinates")),
            }
        };
        match verb {
            "move" => Ok(InputEvent::PointerMoved(position()?)),
            "click" => Ok(InputEvent::PointerReleased {
                button: PointerButton::Left,
                position: position()?,
            }),
            "undo" | "right" => Ok(InputEvent::PointerReleased {
                button: PointerButton::Right,
                position: position()?,
            }),
            "key" => match args.as_slice() {
                [name] => Key::from_name(&name.to_ascii_lowercase())
                    .map(InputEvent::Key)
                    .ok_or_else(|| format!("unknown key {name:?}")),
                _ => Err("`key` takes one key name".to_string()),
            },
            other => Err(format!("unknown event {other:?}")),
        }
    }
}

/// Where the event loop pulls input from.
pub trait EventSource {
    /// Wait at most `timeout` and return every pending event, possibly
    /// none. `None` means the source is closed.
    fn poll(&mut self, timeout: Duration) -> Option<Vec<InputEvent>>;
}

/// Where the event loop shows frames.
pub trait FrameSink {
    fn present(&mut self, frame: &RgbaImage) -> Result<(), LassoError>;
}

/// Sink that drops every frame.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &RgbaImage) -> Result<(), LassoError> {
        Ok(())
    }
}

/// Pre-recorded input, one batch per script line.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            batches: events.into_iter().map(|e| vec![e]).collect(),
        }
    }

    /// Parse a script. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, LassoError> {
        let mut events = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let event = line.parse::<InputEvent>().map_err(|message| LassoError::ParseEvent {
                line: i + 1,
                message,
            })?;
            events.push(event);
        }
        Ok(Self::new(events))
    }

    pub fn load(path: &Path) -> Result<Self, LassoError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self, _timeout: Duration) -> Option<Vec<InputEvent>> {
        self.batches.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_verb() {
        assert_eq!(
            "move 1 2.5".parse::<InputEvent>(),
            Ok(InputEvent::PointerMoved(Point::new(1.0, 2.5)))
        );
        assert_eq!(
            "click 3 4".parse::<InputEvent>(),
            Ok(InputEvent::PointerReleased {
                button: PointerButton::Left,
                position: Point::new(3.0, 4.0)
            })
        );
        assert_eq!(
            "right 0 0".parse::<InputEvent>(),
            Ok(InputEvent::PointerReleased {
                button: PointerButton::Right,
                position: Point::ZERO
            })
        );
        assert_eq!("key Enter".parse::<InputEvent>(), Ok(InputEvent::Key(Key::Confirm)));
        assert_eq!("key w".parse::<InputEvent>(), Ok(InputEvent::Key(Key::PanUp)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!("jump 1 2".parse::<InputEvent>().is_err());
        assert!("move 1".parse::<InputEvent>().is_err());
        assert!("key x".parse::<InputEvent>().is_err());
        assert!("click a b".parse::<InputEvent>().is_err());
    }

    #[test]
    fn script_skips_comments_and_reports_line() {
        let script = "# start\nclick 1 1\n\nmove 2 2 # hover\nkey esc\n";
        let mut source = ScriptedEvents::parse(script).unwrap();
        assert_eq!(source.remaining(), 3);
        let first = source.poll(Duration::ZERO).unwrap();
        assert_eq!(first.len(), 1);

        let err = ScriptedEvents::parse("click 1 1\nbogus\n").unwrap_err();
        assert!(matches!(err, LassoError::ParseEvent { line: 2, .. }));
    }

    #[test]
    fn source_closes_when_drained() {
        let mut source = ScriptedEvents::new([InputEvent::Key(Key::Quit)]);
        assert!(source.poll(Duration::ZERO).is_some());
        assert!(source.poll(Duration::ZERO).is_none());
    }
}
