//! Line-oriented s-expression landmark traces.
//!
//! One record per line:
//!
//! ```text
//! (:type :dimensions :width 640 :height 480)
//! (:type :frame :t 0.033 :landmarks ((x y) (x y) ...))
//! (:type :frame :t 0.066)                 ; no face
//! (:type :config :ear-threshold 0.22 :wink-min 0.2 :wink-max 0.5)
//! (:type :reset)
//! ```
//!
//! `;` starts a comment; blank lines are skipped.  A frame whose
//! `:landmarks` is missing, `nil` or `()` had no face.

use std::io::BufRead;

use anyhow::{anyhow, bail, Context, Result};
use lexpr::Value;
use tracing::warn;

use super::plist::{as_f64, get_float, get_int, get_keyword, get_value, is_nil, list_items};
use crate::eye::{LandmarkSet, Point2};
use crate::input_source::{ConfigUpdate, InputEvent, InputProvider};

/// Reads trace records from any buffered reader.
pub struct TraceReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of the last line read (1-based).
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> InputProvider for TraceReader<R> {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        loop {
            self.buf.clear();
            let n = self
                .reader
                .read_line(&mut self.buf)
                .with_context(|| format!("reading trace line {}", self.line_no + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let record = strip_comment(&self.buf).trim();
            if record.is_empty() {
                continue;
            }
            return match parse_record(record) {
                Ok(event) => Ok(Some(event)),
                Err(e) => {
                    warn!("trace line {}: {:#}", self.line_no, e);
                    Err(e.context(format!("trace line {}", self.line_no)))
                }
            };
        }
    }
}

/// Text before the first `;` outside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ';' {
            return &line[..i];
        }
    }
    line
}

/// Parse one record.
pub fn parse_record(text: &str) -> Result<InputEvent> {
    let value = lexpr::from_str(text).map_err(|e| anyhow!("malformed s-expression: {}", e))?;
    let record_type = get_keyword(&value, "type").ok_or_else(|| anyhow!("record has no :type"))?;

    match record_type.as_str() {
        "dimensions" => Ok(InputEvent::Dimensions {
            width: get_dimension(&value, "width")?,
            height: get_dimension(&value, "height")?,
        }),
        "frame" => {
            let timestamp_s = get_float(&value, "t")
                .ok_or_else(|| anyhow!("frame record needs a numeric :t"))?;
            if !timestamp_s.is_finite() {
                bail!("frame timestamp must be finite, got {}", timestamp_s);
            }
            let landmarks = match get_value(&value, "landmarks") {
                None => None,
                Some(v) if is_nil(v) => None,
                Some(v) => Some(parse_landmarks(v)?),
            };
            Ok(InputEvent::Frame {
                timestamp_s,
                landmarks,
            })
        }
        "config" => Ok(InputEvent::Configure(ConfigUpdate {
            ear_threshold: get_float(&value, "ear-threshold"),
            wink_min_s: get_float(&value, "wink-min"),
            wink_max_s: get_float(&value, "wink-max"),
        })),
        "reset" => Ok(InputEvent::Reset),
        other => bail!("unknown record type :{}", other),
    }
}

fn get_dimension(value: &Value, key: &str) -> Result<u32> {
    let raw = get_int(value, key).ok_or_else(|| anyhow!("dimensions record needs an integer :{}", key))?;
    u32::try_from(raw).map_err(|_| anyhow!(":{} out of range: {}", key, raw))
}

fn parse_landmarks(value: &Value) -> Result<LandmarkSet> {
    let items = list_items(value).ok_or_else(|| anyhow!(":landmarks must be a list of (x y) pairs"))?;
    let mut points = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let pair = list_items(item)
            .filter(|p| p.len() == 2)
            .ok_or_else(|| anyhow!("landmark {} is not an (x y) pair", i))?;
        let coord = |v: &Value| -> Result<i32> {
            let c = as_f64(v)
                .filter(|c| c.is_finite())
                .ok_or_else(|| anyhow!("landmark {} has a non-numeric coordinate", i))?
                .round();
            if c < f64::from(i32::MIN) || c > f64::from(i32::MAX) {
                bail!("landmark {} coordinate out of range: {}", i, c);
            }
            Ok(c as i32)
        };
        points.push(Point2::new(coord(pair[0])?, coord(pair[1])?));
    }
    Ok(LandmarkSet::new(points))
}

/// Render a `:dimensions` record.
pub fn dimensions_record(width: u32, height: u32) -> String {
    format!("(:type :dimensions :width {} :height {})", width, height)
}

/// Render a `:frame` record; `None` writes a frame without a face.
pub fn frame_record(timestamp_s: f64, landmarks: Option<&LandmarkSet>) -> String {
    match landmarks {
        None => format!("(:type :frame :t {})", timestamp_s),
        Some(set) => {
            let pts: Vec<String> = set
                .points()
                .iter()
                .map(|p| format!("({} {})", p.x, p.y))
                .collect();
            format!("(:type :frame :t {} :landmarks ({}))", timestamp_s, pts.join(" "))
        }
    }
}
