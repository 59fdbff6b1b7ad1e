//! Output sinks for `console.log` and `alert`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Console,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub channel: Channel,
    pub text: String,
}

/// Accepts a line of text and presents it; nothing is returned.
pub trait Sink {
    fn emit(&mut self, channel: Channel, text: &str);
}

/// Collects emissions in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<Emission>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything emitted so far.
    pub fn take(&self) -> Vec<Emission> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|e| e.text.clone()).collect()
    }
}

impl Sink for BufferSink {
    fn emit(&mut self, channel: Channel, text: &str) {
        log::trace!("{:?}: {}", channel, text);
        self.lines.borrow_mut().push(Emission {
            channel,
            text: text.to_owned(),
        });
    }
}

/// Writes straight to stdout; alerts are marked so they stand out.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&mut self, channel: Channel, text: &str) {
        match channel {
            Channel::Console => println!("{}", text),
            Channel::Alert => println!("[alert] {}", text),
        }
    }
}
