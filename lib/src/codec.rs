//! Composite list values.
//!
//! [`ListCodec`] turns the elements collected from an `rdf:first`/`rdf:rest`
//! chain into one term. [`CdtListCodec`] writes SPARQL-CDT list literals such as
//! `"[1, <http://example.org/b>, \"x\"@en]"^^cdt:List` and can read them back.

use crate::consts::{CDT_LIST, XSD_BOOLEAN, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER};
use crate::errors::ConvertError;
use oxigraph::model::{BlankNode, Literal, NamedNode, Term};
use std::fmt::Write;
use std::str::FromStr;

/// Builds a composite value from an ordered sequence of list elements.
pub trait ListCodec {
    fn encode(&self, elements: &[Term]) -> Term;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CdtListCodec;

impl ListCodec for CdtListCodec {
    fn encode(&self, elements: &[Term]) -> Term {
        Literal::new_typed_literal(Self::lexical_form(elements), CDT_LIST).into()
    }
}

impl CdtListCodec {
    /// The lexical form of the list literal for `elements`
    pub fn lexical_form(elements: &[Term]) -> String {
        let mut out = String::from("[");
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_element(&mut out, element);
        }
        out.push(']');
        out
    }

    /// Parses a `cdt:List` literal back into its elements.
    pub fn decode(literal: &Literal) -> Result<Vec<Term>, ConvertError> {
        if literal.datatype() != CDT_LIST {
            return Err(ConvertError::InvalidListLiteral(format!(
                "expected datatype <{}>, found <{}>",
                CDT_LIST.as_str(),
                literal.datatype().as_str()
            )));
        }
        let mut reader = ListReader::new(literal.value());
        let elements = reader.list()?;
        reader.skip_whitespace();
        if !reader.at_end() {
            return Err(reader.error("trailing content after list"));
        }
        Ok(elements)
    }
}

fn write_element(out: &mut String, element: &Term) {
    match element {
        Term::Literal(literal) => write_literal(out, literal),
        // IRIs and blank nodes render as in N-Triples
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    let datatype = literal.datatype();
    let value = literal.value();
    let bare = (datatype == XSD_INTEGER && is_integer(value))
        || (datatype == XSD_DECIMAL && is_decimal(value))
        || (datatype == XSD_DOUBLE && is_double(value))
        || (datatype == XSD_BOOLEAN && (value == "true" || value == "false"));
    if bare {
        out.push_str(value);
    } else if datatype == CDT_LIST && CdtListCodec::decode(literal).is_ok() {
        // well-formed nested lists are written inline
        out.push_str(value);
    } else {
        let _ = write!(out, "{}", literal);
    }
}

fn split_sign(value: &str) -> &str {
    value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value)
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer(value: &str) -> bool {
    is_digits(split_sign(value))
}

fn is_decimal(value: &str) -> bool {
    match split_sign(value).split_once('.') {
        Some((int, frac)) => (int.is_empty() || is_digits(int)) && is_digits(frac),
        None => false,
    }
}

fn is_double(value: &str) -> bool {
    let Some(pos) = value.find(['e', 'E']) else {
        return false;
    };
    let (mantissa, exponent) = (&value[..pos], &value[pos + 1..]);
    let mantissa = split_sign(mantissa);
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (is_digits(int) && (frac.is_empty() || is_digits(frac)))
                || (int.is_empty() && is_digits(frac))
        }
        None => is_digits(mantissa),
    };
    mantissa_ok && is_integer(exponent)
}

struct ListReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ListReader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, msg: &str) -> ConvertError {
        ConvertError::InvalidListLiteral(format!("{} at offset {}", msg, self.pos))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ConvertError> {
        if self.bump() == Some(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn list(&mut self) -> Result<Vec<Term>, ConvertError> {
        self.skip_whitespace();
        self.expect('[')?;
        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(elements);
        }
        loop {
            self.skip_whitespace();
            elements.push(self.element()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(elements),
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn element(&mut self) -> Result<Term, ConvertError> {
        match self.peek() {
            Some('<') => {
                let token = self.iri_token()?;
                parse_term::<NamedNode>(token)
            }
            Some('_') => {
                let token = self.token();
                parse_term::<BlankNode>(token)
            }
            Some('"') => {
                let token = self.quoted_token()?;
                parse_term::<Literal>(token)
            }
            Some('[') => {
                let start = self.pos;
                self.list()?;
                let nested = &self.input[start..self.pos];
                Ok(Literal::new_typed_literal(nested, CDT_LIST).into())
            }
            Some(_) => self.bare_literal(),
            None => Err(self.error("unexpected end of list")),
        }
    }

    /// `<...>` including the brackets
    fn iri_token(&mut self) -> Result<&'a str, ConvertError> {
        let rest = self.rest();
        let end = rest
            .find('>')
            .ok_or_else(|| self.error("unterminated IRI"))?;
        self.pos += end + 1;
        Ok(&rest[..=end])
    }

    /// Characters up to the next delimiter
    fn token(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == ',' || c == ']' || c.is_whitespace())
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// A quoted string with its language tag or datatype suffix
    fn quoted_token(&mut self) -> Result<&'a str, ConvertError> {
        let start = self.pos;
        self.expect('"')?;
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    self.bump();
                }
                Some(_) => {}
                None => return Err(self.error("unterminated string")),
            }
        }
        if self.peek() == Some('@') {
            self.token();
        } else if self.rest().starts_with("^^") {
            self.pos += 2;
            self.iri_token()?;
        }
        Ok(&self.input[start..self.pos])
    }

    fn bare_literal(&mut self) -> Result<Term, ConvertError> {
        let token = self.token();
        let datatype = if token == "true" || token == "false" {
            XSD_BOOLEAN
        } else if is_integer(token) {
            XSD_INTEGER
        } else if is_decimal(token) {
            XSD_DECIMAL
        } else if is_double(token) {
            XSD_DOUBLE
        } else {
            return Err(self.error(&format!("unrecognized list element '{}'", token)));
        };
        Ok(Literal::new_typed_literal(token, datatype).into())
    }
}

fn parse_term<T>(token: &str) -> Result<Term, ConvertError>
where
    T: FromStr + Into<Term>,
    T::Err: std::fmt::Display,
{
    token.parse::<T>().map(Into::into).map_err(|e| {
        ConvertError::InvalidListLiteral(format!("invalid list element '{}': {}", token, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Term {
        Literal::from(v).into()
    }

    fn iri(v: &str) -> Term {
        NamedNode::new(v).unwrap().into()
    }

    fn list_literal(term: Term) -> Literal {
        match term {
            Term::Literal(l) => l,
            other => panic!("expected a literal, got {}", other),
        }
    }

    #[test]
    fn test_encode_numbers() {
        let term = CdtListCodec.encode(&[int(1), int(2), int(3)]);
        let literal = list_literal(term);
        assert_eq!(literal.value(), "[1, 2, 3]");
        assert_eq!(literal.datatype(), CDT_LIST);
    }

    #[test]
    fn test_encode_empty() {
        let literal = list_literal(CdtListCodec.encode(&[]));
        assert_eq!(literal.value(), "[]");
    }

    #[test]
    fn test_encode_mixed_elements() {
        let elements = vec![
            iri("http://example.org/b"),
            int(42),
            iri("http://example.org/c"),
            Literal::new_simple_literal("say \"hi\"").into(),
            Literal::new_language_tagged_literal("chat", "fr").unwrap().into(),
            BlankNode::new("b0").unwrap().into(),
            Literal::new_typed_literal("2024-01-01", NamedNode::new("http://www.w3.org/2001/XMLSchema#date").unwrap()).into(),
        ];
        assert_eq!(
            CdtListCodec::lexical_form(&elements),
            "[<http://example.org/b>, 42, <http://example.org/c>, \"say \\\"hi\\\"\", \"chat\"@fr, _:b0, \"2024-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>]"
        );
    }

    #[test]
    fn test_malformed_number_keeps_datatype() {
        let odd = Literal::new_typed_literal("forty-two", XSD_INTEGER).into();
        assert_eq!(
            CdtListCodec::lexical_form(&[odd]),
            "[\"forty-two\"^^<http://www.w3.org/2001/XMLSchema#integer>]"
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let elements = vec![
            iri("http://example.org/b"),
            int(-7),
            Literal::new_typed_literal("4.25", XSD_DECIMAL).into(),
            Literal::new_typed_literal("1.5E3", XSD_DOUBLE).into(),
            Literal::from(true).into(),
            Literal::new_simple_literal("a, b]\n").into(),
            Literal::new_language_tagged_literal("hello", "en").unwrap().into(),
            BlankNode::new("x1").unwrap().into(),
        ];
        let literal = list_literal(CdtListCodec.encode(&elements));
        assert_eq!(CdtListCodec::decode(&literal).unwrap(), elements);
    }

    #[test]
    fn test_nested_list() {
        let inner = CdtListCodec.encode(&[int(1), int(2)]);
        let outer = list_literal(CdtListCodec.encode(&[inner.clone(), int(3)]));
        assert_eq!(outer.value(), "[[1, 2], 3]");
        assert_eq!(CdtListCodec::decode(&outer).unwrap(), vec![inner, int(3)]);
    }

    #[test]
    fn test_malformed_nested_list_keeps_datatype() {
        let odd = Literal::new_typed_literal("not a list", CDT_LIST);
        let literal = list_literal(CdtListCodec.encode(&[odd.clone().into(), int(1)]));
        assert_eq!(
            literal.value(),
            "[\"not a list\"^^<http://w3id.org/awslabs/neptune/SPARQL-CDTs/List>, 1]"
        );
        assert_eq!(
            CdtListCodec::decode(&literal).unwrap(),
            vec![odd.into(), int(1)]
        );
    }

    #[test]
    fn test_decode_escapes_and_suffixes() {
        let literal = Literal::new_typed_literal(
            "[\"a\\u00e9\\\"\"@en, \"x, y\"^^<http://www.w3.org/2001/XMLSchema#string>, \"7\"^^<http://example.org/dt>, _:b1]",
            CDT_LIST,
        );
        assert_eq!(
            CdtListCodec::decode(&literal).unwrap(),
            vec![
                Term::from(Literal::new_language_tagged_literal("a\u{e9}\"", "en").unwrap()),
                Literal::new_simple_literal("x, y").into(),
                Literal::new_typed_literal("7", NamedNode::new("http://example.org/dt").unwrap())
                    .into(),
                BlankNode::new("b1").unwrap().into(),
            ]
        );
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let wrong_type = Literal::new_simple_literal("[1]");
        assert!(CdtListCodec::decode(&wrong_type).is_err());
        for bad in ["[1, 2", "1, 2]", "[1 2]", "[\"open]", "[<http://ex/a]", "[1] x", "[foo]"] {
            let literal = Literal::new_typed_literal(bad, CDT_LIST);
            assert!(
                matches!(
                    CdtListCodec::decode(&literal),
                    Err(ConvertError::InvalidListLiteral(_))
                ),
                "{} should not decode",
                bad
            );
        }
    }

    #[test]
    fn test_numeric_lexical_checks() {
        assert!(is_integer("+12"));
        assert!(!is_integer("1.0"));
        assert!(is_decimal("-.5"));
        assert!(!is_decimal("5."));
        assert!(is_double("5.E2"));
        assert!(is_double(".5e-1"));
        assert!(!is_double("1.5"));
    }
}
