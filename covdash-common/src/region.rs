//! Region field parsing
//!
//! The statistics API nests province metadata in a `region` object. CSV exports
//! of the same data carry that object serialized as text, either as JSON or as a
//! Python literal mapping such as
//! `{'iso': 'NLD', 'name': 'Netherlands', 'province': 'Drenthe', 'cities': []}`.
//!
//! Parsing never fails: malformed text yields an empty mapping.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Parse a serialized region field into a mapping
///
/// Tries JSON first, then the literal-mapping grammar. Anything that is not a
/// mapping, or does not parse completely, yields an empty map.
pub fn parse_region(text: &str) -> Map<String, Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Map::new();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return map;
    }

    let mut parser = LiteralParser::new(trimmed);
    match parser.parse_document() {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Province name from a region mapping, if present and a string
pub fn province_of(map: &Map<String, Value>) -> Option<&str> {
    map.get("province").and_then(Value::as_str)
}

/// Typed view of the region attributes the dashboard uses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionInfo {
    pub iso: Option<String>,
    pub name: Option<String>,
    pub province: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl RegionInfo {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            iso: string_field(map, "iso"),
            name: string_field(map, "name"),
            province: string_field(map, "province"),
            lat: float_field(map, "lat"),
            long: float_field(map, "long"),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

// Coordinates arrive as strings ("52.1") from the API, numbers elsewhere.
fn float_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Recursive-descent parser for Python literal mappings
struct LiteralParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn parse_document(&mut self) -> Option<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        // Trailing garbage means the whole field is malformed
        if self.chars.peek().is_some() {
            return None;
        }
        Some(value)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        self.skip_whitespace();
        (self.chars.next()? == expected).then_some(())
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match *self.chars.peek()? {
            '{' => self.parse_mapping(),
            '[' => self.parse_sequence(']'),
            '(' => self.parse_sequence(')'),
            '\'' | '"' => self.parse_string().map(Value::String),
            c if c == '-' || c == '+' || c.is_ascii_digit() => self.parse_number(),
            c if c.is_alphabetic() => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_mapping(&mut self) -> Option<Value> {
        self.expect('{')?;
        let mut map = Map::new();

        self.skip_whitespace();
        if self.chars.peek() == Some(&'}') {
            self.chars.next();
            return Some(Value::Object(map));
        }

        loop {
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.chars.next()? {
                ',' => {
                    // Allow a trailing comma before the closing brace
                    self.skip_whitespace();
                    if self.chars.peek() == Some(&'}') {
                        self.chars.next();
                        return Some(Value::Object(map));
                    }
                }
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
        }
    }

    fn parse_sequence(&mut self, close: char) -> Option<Value> {
        self.chars.next();
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.chars.peek() == Some(&close) {
            self.chars.next();
            return Some(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.chars.next()? {
                ',' => {
                    self.skip_whitespace();
                    if self.chars.peek() == Some(&close) {
                        self.chars.next();
                        return Some(Value::Array(items));
                    }
                }
                c if c == close => return Some(Value::Array(items)),
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();

        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Number(i.into()));
        }
        let f = text.parse::<f64>().ok()?;
        Number::from_f64(f).map(Value::Number)
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            "nan" | "NaN" => Some(Value::Null),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_literal() {
        let map = parse_region(
            "{'iso': 'NLD', 'name': 'Netherlands', 'province': 'Drenthe', 'lat': '52.8', 'long': '6.6', 'cities': []}",
        );
        assert_eq!(province_of(&map), Some("Drenthe"));
        assert_eq!(map["iso"], "NLD");
        assert_eq!(map["cities"], Value::Array(vec![]));
    }

    #[test]
    fn test_parse_double_quoted_with_apostrophe() {
        let map = parse_region(
            r#"{'iso': 'FRA', 'province': "Provence-Alpes-Côte d'Azur", 'cities': []}"#,
        );
        assert_eq!(province_of(&map), Some("Provence-Alpes-Côte d'Azur"));
    }

    #[test]
    fn test_parse_json_object() {
        let map = parse_region(r#"{"iso": "BEL", "province": "Antwerp", "lat": "51.2"}"#);
        assert_eq!(province_of(&map), Some("Antwerp"));
    }

    #[test]
    fn test_parse_nested_values_and_keywords() {
        let map = parse_region(
            "{'province': 'X', 'cities': [{'name': 'A', 'fips': None, 'ok': True}], 'n': -3, 'f': 1.5e2}",
        );
        assert_eq!(map["cities"][0]["name"], "A");
        assert_eq!(map["cities"][0]["fips"], Value::Null);
        assert_eq!(map["cities"][0]["ok"], Value::Bool(true));
        assert_eq!(map["n"], -3);
        assert_eq!(map["f"].as_f64(), Some(150.0));
    }

    #[test]
    fn test_malformed_yields_empty_map() {
        assert!(parse_region("{'iso': 'NLD', 'province': ").is_empty());
        assert!(parse_region("not a mapping").is_empty());
        assert!(parse_region("['a', 'b']").is_empty());
        assert!(parse_region("{'a': 1} trailing").is_empty());
        assert!(parse_region("").is_empty());
        assert!(parse_region("nan").is_empty());
    }

    #[test]
    fn test_region_info_coordinates() {
        let map = parse_region("{'iso': 'NLD', 'province': 'Drenthe', 'lat': '52.8', 'long': 6.6}");
        let info = RegionInfo::from_map(&map);
        assert_eq!(info.iso.as_deref(), Some("NLD"));
        assert_eq!(info.lat, Some(52.8));
        assert_eq!(info.long, Some(6.6));
        assert_eq!(info.name, None);
    }

    #[test]
    fn test_province_missing() {
        let map = parse_region("{'iso': 'LUX'}");
        assert_eq!(province_of(&map), None);
    }
}
