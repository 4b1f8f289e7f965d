//! Closed value model the canonicalizer recurses over

use crate::error::{CorpayError, Result};
use serde::Serialize;
use serde_json::{Number, Value};

/// Leaf value of a request/response body
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

/// A body value: insertion order of record fields is significant
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Scalar(Scalar),
    List(Vec<Node>),
    Record(Vec<(String, Node)>),
}

impl Node {
    /// Convert any serializable schema into the variant form.
    ///
    /// Field order follows the struct declaration order.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(|v| Node::from(&v))
            .map_err(|_| CorpayError::MalformedPayload)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Node::Record(_))
    }

    /// Look up a record field by name
    pub fn field(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Scalar {
    /// Plain text form: strings verbatim, never quoted or locale formatted
    pub fn render(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => render_number(n),
        }
    }
}

fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    js_number(&n.to_string())
}

/// Re-spell a shortest round-trip float the way the bank's reference client
/// prints numbers: `500.0` -> `500`, `1e21` -> `1e+21`, `1e-6` -> `0.000001`.
fn js_number(shortest: &str) -> String {
    let (sign, text) = match shortest.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", shortest),
    };
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (text, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all = format!("{int_part}{frac_part}");
    let leading_zeros = all.len() - all.trim_start_matches('0').len();
    let digits = all.trim_matches('0');
    if digits.is_empty() {
        return "0".to_string();
    }

    // value = 0.<digits> * 10^point
    let point = int_part.len() as i32 - leading_zeros as i32 + exponent;
    let k = digits.len() as i32;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(-point as usize))
    } else {
        let e = point - 1;
        let exp_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{exp_sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{exp_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Node::Scalar(Scalar::Text(s.clone())),
            Value::Array(items) => Node::List(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Record(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from(v)))
                    .collect(),
            ),
        }
    }
}
