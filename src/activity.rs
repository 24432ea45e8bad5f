use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::Mutex;

const MAX_LOG_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Http,
    Error,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub text: String,
    pub kind: Kind,
}

static ACTIVITY_LOG: Lazy<Mutex<VecDeque<Entry>>> = Lazy::new(|| Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES)));

pub fn log<T: Into<String>>(line: T) {
    log_with(Kind::Info, line);
}

pub fn log_with<T: Into<String>>(kind: Kind, line: T) {
    if let Ok(mut buf) = ACTIVITY_LOG.lock() {
        let s = line.into();
        if buf.len() >= MAX_LOG_LINES { buf.pop_front(); }
        buf.push_back(Entry { text: s, kind });
    }
}

pub fn recent(n: usize) -> Vec<Entry> {
    if let Ok(buf) = ACTIVITY_LOG.lock() {
        let len = buf.len();
        let take = n.min(len);
        buf.iter().skip(len - take).cloned().collect()
    } else {
        Vec::new()
    }
}

pub fn latest() -> Option<Entry> {
    recent(1).pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_kind_and_bound() {
        log_with(Kind::Error, "activity kind marker");
        let found = recent(MAX_LOG_LINES)
            .into_iter()
            .find(|e| e.text == "activity kind marker");
        assert_eq!(found.map(|e| e.kind), Some(Kind::Error));

        for i in 0..(MAX_LOG_LINES + 10) {
            log(format!("bounded line {}", i));
        }
        assert!(recent(usize::MAX).len() <= MAX_LOG_LINES);
        assert!(latest().is_some());
    }
}
