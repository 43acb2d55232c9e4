//! XML text to a JSON-compatible tree.
//!
//! Element names become object keys (prefixes kept), attributes are dropped,
//! leaf text stays a string, empty elements become `""`, and repeated
//! siblings collapse into an array. Text next to child elements is kept
//! under `#text`.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

pub const TEXT_KEY: &str = "#text";

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self { name, children: Map::new(), text: String::new() }
    }

    fn into_value(mut self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text);
        }
        if !self.text.is_empty() {
            self.children.insert(TEXT_KEY.to_string(), Value::String(self.text));
        }
        Value::Object(self.children)
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

/// Parses a whole XML document.
///
/// # Errors
/// Returns a parser message for mismatched or unclosed tags, text outside
/// the root element, more than one root element, or a document without one.
pub fn parse_xml(xml: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    // stack[0] is the document itself
    let mut stack = vec![Frame::new(String::new())];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                check_single_root(&stack, &name)?;
                stack.push(Frame::new(name));
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                check_single_root(&stack, &name)?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_child(name, Value::String(String::new()));
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("invalid text at byte {}: {}", reader.buffer_position(), err))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e).into_owned();
                append_text(&mut stack, &text)?;
            }
            Ok(Event::End(_)) => {
                // check_end_names guarantees the name matches the open frame
                let frame = match stack.pop() {
                    Some(frame) if !stack.is_empty() => frame,
                    _ => return Err("closing tag without an open element".to_string()),
                };
                let name = frame.name.clone();
                if let Some(parent) = stack.last_mut() {
                    parent.push_child(name, frame.into_value());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!("error at byte {}: {}", reader.buffer_position(), err));
            }
        }
        buf.clear();
    }

    if stack.len() != 1 {
        let open = stack.last().map(|f| f.name.clone()).unwrap_or_default();
        return Err(format!("unexpected end of document inside <{}>", open));
    }

    let document = stack.pop().map(|f| f.children).unwrap_or_default();
    if document.is_empty() {
        return Err("document has no root element".to_string());
    }
    Ok(Value::Object(document))
}

fn check_single_root(stack: &[Frame], name: &str) -> Result<(), String> {
    match stack {
        [document] if !document.children.is_empty() => {
            Err(format!("second root element <{}> after the document element", name))
        }
        _ => Ok(()),
    }
}

fn append_text(stack: &mut [Frame], text: &str) -> Result<(), String> {
    if text.is_empty() {
        return Ok(());
    }
    match stack {
        [_document] => Err(format!("text outside the root element: {:.40}", text)),
        [.., current] => {
            current.text.push_str(text);
            Ok(())
        }
        [] => Err("parser stack underflow".to_string()),
    }
}
