/// Command parser for the inner text of a directive
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ARGUMENT_RE: Regex = Regex::new(r#"(\w+)="(.*?)""#).unwrap();
}

/// Named directive arguments, kept in the order they were written
///
/// Re-assigning a key keeps its original position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(String, String)>,
}

impl Arguments {
    pub fn new() -> Self {
        Arguments {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (key, value) in iter {
            args.insert(key, value);
        }
        args
    }
}

/// Split directive text into its command name and `key="value"` arguments
///
/// The name is everything up to the first run of whitespace. Values run up to
/// the next `"`; there is no way to escape a quote inside a value.
pub fn parse_command(text: &str) -> (String, Arguments) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => {
            let (name, tail) = text.split_at(idx);
            let args = ARGUMENT_RE
                .captures_iter(tail)
                .map(|caps| (caps[1].to_string(), caps[2].to_string()))
                .collect();
            (name.to_string(), args)
        }
        None => (text.to_string(), Arguments::new()),
    }
}
