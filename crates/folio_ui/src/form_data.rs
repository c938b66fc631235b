use serde_json::{Map, Value};

use crate::tree::ControlTree;

/// Ordered name/value pairs collected from the enabled fields of a rendered
/// page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: &ControlTree) -> Self {
        tree.fields()
            .into_iter()
            .filter(|field| !field.disabled && !field.name.is_empty())
            .filter_map(|field| field.submitted_value().map(|value| (field.name.clone(), value.to_string())))
            .collect()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces the first entry named `name`, or appends one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with every name prefixed, e.g. `contextInfo.`.
    pub fn prefixed(&self, prefix: &str) -> FormData {
        self.entries
            .iter()
            .map(|(name, value)| (format!("{prefix}{name}"), value.clone()))
            .collect()
    }

    /// Nested JSON object built by splitting names on `.` and `[i]`:
    /// `positions[0].unitPrice` becomes `{"positions": [{"unitPrice": ..}]}`.
    pub fn to_json(&self) -> Value {
        let mut root = Value::Object(Map::new());
        for (name, value) in &self.entries {
            insert_path(&mut root, &segments(name), Value::String(value.clone()));
        }
        root
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (name, value) in iter {
            data.append(name, value);
        }
        data
    }
}

#[derive(Debug, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn segments(name: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for part in name.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(at) => part.split_at(at),
            None => (part, ""),
        };
        out.push(Segment::Key(key.to_string()));
        while let Some(stripped) = rest.strip_prefix('[') {
            let Some(close) = stripped.find(']') else {
                break;
            };
            match stripped[..close].parse::<usize>() {
                Ok(index) => out.push(Segment::Index(index)),
                Err(_) => out.push(Segment::Key(stripped[..close].to_string())),
            }
            rest = &stripped[close + 1..];
        }
    }
    out
}

fn insert_path(target: &mut Value, path: &[Segment], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *target = value;
        return;
    };
    match first {
        Segment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                insert_path(slot, rest, value);
            }
        }
        Segment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                insert_path(&mut items[*index], rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        assert_eq!(
            segments("contextInfo.positions[2].unitPrice"),
            vec![
                Segment::Key("contextInfo".to_string()),
                Segment::Key("positions".to_string()),
                Segment::Index(2),
                Segment::Key("unitPrice".to_string()),
            ]
        );
        assert_eq!(segments("seller"), vec![Segment::Key("seller".to_string())]);
    }
}
