// src/gviz/envelope.rs

use anyhow::bail;
use std::str::FromStr;

use crate::error::{Result, SheetError};

/// Characters before the JSON payload: `/*O_o*/\n` followed by
/// `google.visualization.Query.setResponse(`.
pub const BANNER_LEN: usize = 47;
/// Trailing `);` after the JSON payload.
pub const TRAILER_LEN: usize = 2;

/// How the JSON document is cut out of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// From the first `{` to the last `}`. Survives banner changes.
    Braces,
    /// Drop exactly `prefix` leading and `suffix` trailing characters.
    Fixed { prefix: usize, suffix: usize },
}

impl Framing {
    pub const GVIZ: Framing = Framing::Fixed {
        prefix: BANNER_LEN,
        suffix: TRAILER_LEN,
    };

    pub fn strip<'a>(&self, raw: &'a str) -> Result<&'a str> {
        match *self {
            Framing::Braces => {
                let start = raw.find('{');
                let end = raw.rfind('}');
                match (start, end) {
                    (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
                    _ => Err(SheetError::Parse(
                        "no JSON object found in response body".to_string(),
                    )),
                }
            }
            Framing::Fixed { prefix, suffix } => {
                let needed = prefix.checked_add(suffix).ok_or_else(|| {
                    SheetError::Parse(format!("envelope offsets {}+{} overflow", prefix, suffix))
                })?;
                let chars = raw.chars().count();
                if chars < needed {
                    return Err(SheetError::Parse(format!(
                        "response body has {} characters, envelope needs {}",
                        chars, needed
                    )));
                }
                let start = byte_offset(raw, prefix);
                let end = byte_offset(raw, chars - suffix);
                Ok(&raw[start..end])
            }
        }
    }
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Braces
    }
}

impl FromStr for Framing {
    type Err = anyhow::Error;

    /// `braces`, `fixed` (47/2) or `fixed:<prefix>:<suffix>`.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim().to_lowercase();
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("braces"), None, None, None) => Ok(Framing::Braces),
            (Some("fixed"), None, None, None) => Ok(Framing::GVIZ),
            (Some("fixed"), Some(prefix), Some(suffix), None) => Ok(Framing::Fixed {
                prefix: prefix.parse()?,
                suffix: suffix.parse()?,
            }),
            _ => bail!("unknown framing {:?}, expected braces or fixed[:prefix:suffix]", s),
        }
    }
}

/// Byte index of the `nth` character, or the end of the string.
fn byte_offset(s: &str, nth: usize) -> usize {
    s.char_indices().nth(nth).map_or(s.len(), |(i, _)| i)
}
