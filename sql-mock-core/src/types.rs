use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rule::RuleError;

/// Pattern accepted for date values, as entered in the rule editor.
pub const DATE_PATTERN: &str = "%Y-%m-%d";

/// Name of the date parser every generated file declares once.
pub const DATE_FORMAT_HELPER: &str = "dateFormat";

/// Java wrapper around [`DATE_FORMAT_HELPER`] that does not throw the
/// checked `ParseException`.
pub const JAVA_DATE_HELPER: &str = "parseDate";

/// Source idiom a generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Conditional chain over a composite handler.
    Java,
    /// Structural pattern matching over executed statements.
    Scala,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Java => write!(f, "java"),
            Target::Scala => write!(f, "scala"),
        }
    }
}

impl Target {
    /// Declaration of the shared date parser, emitted once per file.
    pub fn date_format_declaration(self) -> Vec<String> {
        match self {
            Target::Java => vec![
                format!(
                    "final SimpleDateFormat {DATE_FORMAT_HELPER} = new SimpleDateFormat(\"yyyy-MM-dd\", java.util.Locale.ENGLISH);"
                ),
                format!("final Function<String, Date> {JAVA_DATE_HELPER} = text -> {{"),
                "    try {".to_string(),
                format!("        return {DATE_FORMAT_HELPER}.parse(text);"),
                "    } catch (ParseException e) {".to_string(),
                "        throw new IllegalArgumentException(e);".to_string(),
                "    }".to_string(),
                "};".to_string(),
            ],
            Target::Scala => vec![format!(
                "val {DATE_FORMAT_HELPER} = new java.text.SimpleDateFormat(\"yyyy-MM-dd\", java.util.Locale.ENGLISH)"
            )],
        }
    }
}

/// The closed set of value types a rule can constrain or return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "string")]
    Text,
    #[serde(rename = "float")]
    Number,
    #[serde(rename = "date")]
    Date,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ValueType {
    pub const ALL: [ValueType; 3] = [ValueType::Text, ValueType::Number, ValueType::Date];

    pub fn display_name(self) -> &'static str {
        match self {
            ValueType::Text => "Text",
            ValueType::Number => "Number",
            ValueType::Date => "Date",
        }
    }

    /// Tag used in the rule set JSON.
    pub fn tag(self) -> &'static str {
        match self {
            ValueType::Text => "string",
            ValueType::Number => "float",
            ValueType::Date => "date",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value_type| value_type.tag() == tag)
    }

    pub fn target_type_name(self, target: Target) -> &'static str {
        match (target, self) {
            (Target::Java, ValueType::Text) => "String.class",
            (Target::Java, ValueType::Number) => "Float.class",
            (Target::Java, ValueType::Date) => "Date.class",
            (Target::Scala, ValueType::Text) => "classOf[String]",
            (Target::Scala, ValueType::Number) => "classOf[Float]",
            (Target::Scala, ValueType::Date) => "classOf[java.util.Date]",
        }
    }
}

/// A typed literal whose raw text is valid for its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub struct Value {
    value_type: ValueType,
    raw: String,
}

/// Comparison key: same type and same value once parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Normalized<'a> {
    Text(&'a str),
    Number(f32),
    Date(NaiveDate),
}

impl Value {
    pub fn new(value_type: ValueType, raw: impl Into<String>) -> Result<Self, RuleError> {
        let raw = raw.into();
        validate(value_type, &raw)?;
        Ok(Self { value_type, raw })
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self {
            value_type: ValueType::Text,
            raw: raw.into(),
        }
    }

    pub fn number(raw: impl Into<String>) -> Result<Self, RuleError> {
        Self::new(ValueType::Number, raw)
    }

    pub fn date(raw: impl Into<String>) -> Result<Self, RuleError> {
        Self::new(ValueType::Date, raw)
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Equality a bound parameter must have with a constraint: `Number("1")`
    /// equals `Number("1.0")` but never `Text("1")`.
    pub fn same_as(&self, other: &Value) -> bool {
        self.normalized() == other.normalized()
    }

    pub fn literal(&self, target: Target) -> String {
        format_literal(self, target)
    }

    fn normalized(&self) -> Normalized<'_> {
        // Construction validated `raw`, the fallbacks are unreachable.
        match self.value_type {
            ValueType::Text => Normalized::Text(&self.raw),
            ValueType::Number => Normalized::Number(parse_number(&self.raw).unwrap_or(f32::NAN)),
            ValueType::Date => {
                Normalized::Date(parse_date(&self.raw).unwrap_or(NaiveDate::MIN))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.value_type, self.raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawValue {
    #[serde(rename = "_type")]
    value_type: ValueType,
    value: RawScalar,
}

impl TryFrom<RawValue> for Value {
    type Error = RuleError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        let text = match raw.value {
            RawScalar::Text(text) => text,
            RawScalar::Number(number) => number.to_string(),
        };
        Value::new(raw.value_type, text)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue {
            value_type: value.value_type,
            value: RawScalar::Text(value.raw),
        }
    }
}

/// Checks `raw` is well-formed for `value_type`.
pub fn validate(value_type: ValueType, raw: &str) -> Result<(), RuleError> {
    let valid = match value_type {
        ValueType::Text => true,
        ValueType::Number => parse_number(raw).is_some(),
        ValueType::Date => parse_date(raw).is_some(),
    };
    match valid {
        true => Ok(()),
        false => Err(RuleError::InvalidValue {
            expected: value_type,
            raw: raw.to_string(),
        }),
    }
}

/// Plain decimal literal (optional sign, fraction and exponent) that fits a
/// 32-bit float. Rejects `inf`, `NaN` and hexadecimal forms.
fn parse_number(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let plain = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !plain || !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f32>().ok().filter(|number| number.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_PATTERN).ok()
}

/// Double-quoted string literal valid for both targets. Every embedded quote
/// and backslash is escaped, so are line breaks and other control characters.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for character in text.chars() {
        match character {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Formats a well-formed `raw` text of `value_type` as a target literal.
pub fn format_raw(value_type: ValueType, raw: &str, target: Target) -> String {
    match value_type {
        ValueType::Text => quote(raw),
        // Both targets bind numbers as `Float`, which needs the suffix.
        ValueType::Number => match parse_number(raw) {
            Some(number) => format!("{number}f"),
            None => format!("{}f", raw.trim()),
        },
        ValueType::Date => {
            let date = match parse_date(raw) {
                Some(date) => date.format(DATE_PATTERN).to_string(),
                None => raw.to_string(),
            };
            match target {
                Target::Java => format!("{JAVA_DATE_HELPER}.apply({})", quote(&date)),
                Target::Scala => format!("{DATE_FORMAT_HELPER}.parse({})", quote(&date)),
            }
        }
    }
}

pub fn format_literal(value: &Value, target: Target) -> String {
    format_raw(value.value_type, &value.raw, target)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_quote_is_escaped() {
        assert_eq!(quote(r#"a"b""#), r#""a\"b\"""#);
        assert_eq!(quote(r#""""#), r#""\"\"""#);
    }

    #[test]
    fn backslashes_survive_as_regex_escapes() {
        assert_eq!(quote(r"SELECT \d+"), r#""SELECT \\d+""#);
        assert_eq!(quote("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn numbers_get_float_suffix() {
        let value = Value::number("1").unwrap();
        assert_eq!(value.literal(Target::Java), "1f");
        assert_eq!(value.literal(Target::Scala), "1f");
        assert_eq!(Value::number("+2.50").unwrap().literal(Target::Java), "2.5f");
        assert_eq!(Value::number("-0.25").unwrap().literal(Target::Scala), "-0.25f");
    }

    #[test]
    fn dates_route_through_date_format() {
        let value = Value::date("2014-03-09").unwrap();
        assert_eq!(
            value.literal(Target::Java),
            r#"parseDate.apply("2014-03-09")"#
        );
        assert_eq!(
            value.literal(Target::Scala),
            r#"dateFormat.parse("2014-03-09")"#
        );
    }

    #[test]
    fn java_date_helper_wraps_parse_exception() {
        let declaration = Target::Java.date_format_declaration();
        assert!(declaration[0].starts_with("final SimpleDateFormat dateFormat"));
        assert!(declaration.iter().any(|line| line.contains("catch (ParseException e)")));
        assert_eq!(Target::Scala.date_format_declaration().len(), 1);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Value::number("abc").is_err());
        assert!(Value::number("inf").is_err());
        assert!(Value::number("NaN").is_err());
        assert!(Value::number("1e60").is_err());
        assert!(Value::number("").is_err());
        assert!(Value::date("2014-13-01").is_err());
        assert!(Value::date("09/03/2014").is_err());
        assert!(Value::date("2014-3-9").is_err());
    }

    #[test]
    fn equality_is_typed_and_normalized() {
        let one = Value::number("1").unwrap();
        assert!(one.same_as(&Value::number("1.0").unwrap()));
        assert!(!one.same_as(&Value::text("1")));
        assert!(Value::text("a").same_as(&Value::text("a")));
        assert!(!Value::text("a").same_as(&Value::text("a ")));
    }

    #[test]
    fn type_names_per_target() {
        assert_eq!(ValueType::Number.target_type_name(Target::Java), "Float.class");
        assert_eq!(
            ValueType::Date.target_type_name(Target::Scala),
            "classOf[java.util.Date]"
        );
        assert_eq!(ValueType::from_tag("float"), Some(ValueType::Number));
        assert_eq!(ValueType::from_tag("int"), None);
    }

    #[test]
    fn json_accepts_numeric_values() {
        let value: Value = serde_json::from_str(r#"{"_type":"float","value":1.5}"#).unwrap();
        assert_eq!(value.raw(), "1.5");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"_type":"float","value":"1.5"}"#);
    }
}
