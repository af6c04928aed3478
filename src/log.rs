use std::collections::VecDeque;

const MAX_MESSAGES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MsgLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl MsgLevel {
    pub fn tag(self) -> &'static str {
        match self {
            MsgLevel::Debug => "dbg",
            MsgLevel::Info => "inf",
            MsgLevel::Warn => "wrn",
            MsgLevel::Error => "err",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub level: MsgLevel,
    pub text: String,
}

/// Bounded ring of diagnostic lines. Failures in the keeper are surfaced
/// here and nowhere else; nothing ever raises a dialog.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: VecDeque<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, level: MsgLevel, text: S) {
        if self.messages.len() >= MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(Message {
            level,
            text: text.into(),
        });
    }

    pub fn debug<S: Into<String>>(&mut self, text: S) {
        self.push(MsgLevel::Debug, text);
    }

    pub fn info<S: Into<String>>(&mut self, text: S) {
        self.push(MsgLevel::Info, text);
    }

    pub fn warn<S: Into<String>>(&mut self, text: S) {
        self.push(MsgLevel::Warn, text);
    }

    pub fn error<S: Into<String>>(&mut self, text: S) {
        self.push(MsgLevel::Error, text);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Message> {
        let skip = self.messages.len().saturating_sub(count);
        self.messages.iter().skip(skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_discards_oldest_when_full() {
        let mut log = MessageLog::new();
        for i in 0..(MAX_MESSAGES + 5) {
            log.info(format!("line {i}"));
        }
        assert_eq!(log.iter().count(), MAX_MESSAGES);
        assert_eq!(log.iter().next().unwrap().text, "line 5");
    }

    #[test]
    fn recent_returns_tail() {
        let mut log = MessageLog::new();
        log.debug("a");
        log.warn("b");
        log.error("c");
        let tail: Vec<_> = log.recent(2).map(|m| m.text.as_str()).collect();
        assert_eq!(tail, ["b", "c"]);
    }
}
