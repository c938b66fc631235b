use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub fn from_key(key: &str) -> Option<Operator> {
        match key {
            "$eq" => Some(Operator::Eq),
            "$ne" => Some(Operator::Ne),
            "$lt" => Some(Operator::Lt),
            "$lte" => Some(Operator::Lte),
            "$gt" => Some(Operator::Gt),
            "$gte" => Some(Operator::Gte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("condition is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("condition must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("'{0}' expects an array of conditions")]
    NotAnArray(String),

    #[error("unknown operator '{operator}' for '{path}'")]
    UnknownOperator { path: String, operator: String },

    #[error("empty operator object for '{0}'")]
    EmptyOperator(String),
}

/// Parsed condition expression.
///
/// Keys of one object are ANDed. `$and` and `$or` take arrays of nested
/// expressions, any other key is a property path compared with a literal
/// (`$eq`) or with an operator object such as `{"$gte": 18}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Compare {
        path: String,
        op: Operator,
        operand: Value,
    },
}

impl Condition {
    /// Parses an expression given inline or as a string holding JSON, the
    /// way pages usually ship it.
    pub fn parse(expression: &Value) -> Result<Condition, ConditionError> {
        match expression {
            Value::String(raw) => {
                let inner: Value =
                    serde_json::from_str(raw).map_err(|e| ConditionError::InvalidJson(e.to_string()))?;
                Self::parse_object(&inner)
            }
            other => Self::parse_object(other),
        }
    }

    pub fn parse_str(raw: &str) -> Result<Condition, ConditionError> {
        Self::parse(&Value::String(raw.to_string()))
    }

    fn parse_object(value: &Value) -> Result<Condition, ConditionError> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| Self::parse_entry(key, value))
                .collect::<Result<Vec<_>, _>>()
                .map(Condition::All),
            other => Err(ConditionError::NotAnObject(type_name(other))),
        }
    }

    fn parse_entry(key: &str, value: &Value) -> Result<Condition, ConditionError> {
        match key {
            "$and" => Self::parse_list(key, value).map(Condition::All),
            "$or" => Self::parse_list(key, value).map(Condition::Any),
            path => Self::parse_comparison(path, value),
        }
    }

    fn parse_list(key: &str, value: &Value) -> Result<Vec<Condition>, ConditionError> {
        let Value::Array(items) = value else {
            return Err(ConditionError::NotAnArray(key.to_string()));
        };
        items.iter().map(Self::parse_object).collect()
    }

    fn parse_comparison(path: &str, value: &Value) -> Result<Condition, ConditionError> {
        let Value::Object(operators) = value else {
            return Ok(Condition::Compare {
                path: path.to_string(),
                op: Operator::Eq,
                operand: value.clone(),
            });
        };
        if operators.is_empty() {
            return Err(ConditionError::EmptyOperator(path.to_string()));
        }
        let mut compares = operator_entries(path, operators)?;
        if compares.len() == 1 {
            Ok(compares.remove(0))
        } else {
            Ok(Condition::All(compares))
        }
    }

    /// Property paths referenced anywhere in the expression, in order.
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::All(items) | Condition::Any(items) => {
                items.iter().for_each(|c| c.collect_paths(out))
            }
            Condition::Compare { path, .. } => {
                if !out.contains(&path.as_str()) {
                    out.push(path)
                }
            }
        }
    }
}

fn operator_entries(path: &str, operators: &Map<String, Value>) -> Result<Vec<Condition>, ConditionError> {
    operators
        .iter()
        .map(|(key, operand)| {
            let op = Operator::from_key(key).ok_or_else(|| ConditionError::UnknownOperator {
                path: path.to_string(),
                operator: key.clone(),
            })?;
            Ok(Condition::Compare {
                path: path.to_string(),
                op,
                operand: operand.clone(),
            })
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
