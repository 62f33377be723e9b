//! Byte spans over JSON text that serde_json has already accepted

use std::ops::Range;

use crate::error::{Error, Result};

/// One `"key": value` member of an object
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub key: String,
    pub value: Range<usize>,
}

/// An object's brace offsets and members in source order
#[derive(Debug, Clone)]
pub(crate) struct ObjectSpan {
    pub open: usize,
    pub close: usize,
    pub members: Vec<Member>,
}

impl ObjectSpan {
    /// Last member with this key, matching serde_json's duplicate handling
    pub fn member(&self, key: &str) -> Option<&Member> {
        self.members.iter().rev().find(|m| m.key == key)
    }
}

fn malformed(at: usize) -> Error {
    Error::parse("JSON", format!("unexpected input at byte {at}"))
}

pub(crate) fn skip_ws(src: &[u8], mut i: usize) -> usize {
    while i < src.len() && matches!(src[i], b' ' | b'\t' | b'\n' | b'\r') {
        i += 1;
    }
    i
}

fn string_end(src: &[u8], start: usize) -> Result<usize> {
    let mut i = start + 1;
    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(malformed(start))
}

/// Offset just past the value starting at `start`
pub(crate) fn value_end(src: &[u8], start: usize) -> Result<usize> {
    match src.get(start) {
        Some(b'"') => string_end(src, start),
        Some(b'{') | Some(b'[') => {
            let mut depth = 0usize;
            let mut i = start;
            while i < src.len() {
                match src[i] {
                    b'"' => {
                        i = string_end(src, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth = depth.checked_sub(1).ok_or_else(|| malformed(i))?;
                        if depth == 0 {
                            return Ok(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            Err(malformed(start))
        }
        Some(_) => {
            let mut i = start;
            while i < src.len()
                && !matches!(src[i], b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r')
            {
                i += 1;
            }
            if i == start { Err(malformed(start)) } else { Ok(i) }
        }
        None => Err(malformed(start)),
    }
}

/// Scan the object whose opening brace sits at `open`
pub(crate) fn object_at(text: &str, open: usize) -> Result<ObjectSpan> {
    let src = text.as_bytes();
    if src.get(open) != Some(&b'{') {
        return Err(malformed(open));
    }

    let mut members = Vec::new();
    let mut i = skip_ws(src, open + 1);
    if src.get(i) == Some(&b'}') {
        return Ok(ObjectSpan {
            open,
            close: i,
            members,
        });
    }

    loop {
        if src.get(i) != Some(&b'"') {
            return Err(malformed(i));
        }
        let key_end = string_end(src, i)?;
        let key: String = serde_json::from_str(&text[i..key_end])?;

        i = skip_ws(src, key_end);
        if src.get(i) != Some(&b':') {
            return Err(malformed(i));
        }
        let start = skip_ws(src, i + 1);
        let end = value_end(src, start)?;
        members.push(Member {
            key,
            value: start..end,
        });

        i = skip_ws(src, end);
        match src.get(i) {
            Some(b',') => i = skip_ws(src, i + 1),
            Some(b'}') => {
                return Ok(ObjectSpan {
                    open,
                    close: i,
                    members,
                });
            }
            _ => return Err(malformed(i)),
        }
    }
}
