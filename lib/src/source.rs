//! Drives an oxigraph parser over a reader and reports what it finds to a sink.

use crate::errors::ConvertError;
use crate::sink::TripleSink;
use log::debug;
use oxigraph::io::{RdfFormat, RdfParser, ReaderQuadParser};
use oxigraph::model::Triple;
use std::collections::HashMap;
use std::io::Read;

/// Base and prefix declarations already reported to the sink
#[derive(Default)]
struct Declarations {
    base: Option<String>,
    prefixes: HashMap<String, String>,
}

impl Declarations {
    fn forward<R: Read, S: TripleSink + ?Sized>(
        &mut self,
        parser: &ReaderQuadParser<R>,
        sink: &mut S,
    ) -> Result<(), ConvertError> {
        if let Some(base) = parser.base_iri() {
            if self.base.as_deref() != Some(base) {
                sink.base(base)?;
                self.base = Some(base.to_string());
            }
        }
        for (prefix, iri) in parser.prefixes() {
            if self.prefixes.get(prefix).map(String::as_str) != Some(iri) {
                sink.prefix(prefix, iri)?;
                self.prefixes.insert(prefix.to_string(), iri.to_string());
            }
        }
        Ok(())
    }
}

/// Parses `reader` as `format` and streams every statement into `sink`,
/// followed by a single `finish`.
///
/// Statements of the default graph are reported as triples. Statements in a
/// named graph are reported as quads, which triple-only sinks reject.
pub fn parse_into<R: Read, S: TripleSink + ?Sized>(
    reader: R,
    format: RdfFormat,
    base_iri: Option<&str>,
    sink: &mut S,
) -> Result<(), ConvertError> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base_iri) = base_iri {
        parser = parser.with_base_iri(base_iri)?;
    }
    let mut quads = parser.for_reader(reader);
    let mut declarations = Declarations::default();
    let mut count = 0usize;
    while let Some(quad) = quads.next() {
        let quad = quad?;
        // declarations seen so far precede the statement that follows them
        declarations.forward(&quads, sink)?;
        count += 1;
        if quad.graph_name.is_default_graph() {
            sink.triple(Triple::new(quad.subject, quad.predicate, quad.object))?;
        } else {
            sink.quad(quad)?;
        }
    }
    declarations.forward(&quads, sink)?;
    debug!("Parsed {} statements as {}", count, format.name());
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::GraphCollectorSink;

    #[test]
    fn test_parse_turtle_forwards_prefixes() {
        let data = "@prefix ex: <http://example.org/> .\n\
                    ex:a ex:p ex:b .\n\
                    @prefix foaf: <http://xmlns.com/foaf/0.1/> .\n\
                    ex:a foaf:name \"A\" .\n";
        let mut sink = GraphCollectorSink::new();
        parse_into(data.as_bytes(), RdfFormat::Turtle, None, &mut sink).unwrap();

        assert_eq!(sink.triples().len(), 2);
        assert!(sink
            .prefixes()
            .contains(&("ex".to_string(), "http://example.org/".to_string())));
        assert!(sink
            .prefixes()
            .contains(&("foaf".to_string(), "http://xmlns.com/foaf/0.1/".to_string())));
        assert_eq!(sink.prefixes().len(), 2);
        assert_eq!(sink.finish_calls(), 1);
    }

    #[test]
    fn test_parse_with_base() {
        let data = "<a> <p> <b> .";
        let mut sink = GraphCollectorSink::new();
        parse_into(
            data.as_bytes(),
            RdfFormat::Turtle,
            Some("http://example.org/"),
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.base_iri(), Some("http://example.org/"));
        assert_eq!(
            sink.triples()[0].subject.to_string(),
            "<http://example.org/a>"
        );
    }

    #[test]
    fn test_named_graph_is_reported_as_quad() {
        let data = "<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n";
        let mut sink = GraphCollectorSink::new();
        let err = parse_into(data.as_bytes(), RdfFormat::NQuads, None, &mut sink).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedOperation(_)));
        assert!(!sink.is_finished());
    }

    #[test]
    fn test_default_graph_nquads_are_triples() {
        let data = "<http://ex/s> <http://ex/p> <http://ex/o> .\n";
        let mut sink = GraphCollectorSink::new();
        parse_into(data.as_bytes(), RdfFormat::NQuads, None, &mut sink).unwrap();
        assert_eq!(sink.triples().len(), 1);
    }

    #[test]
    fn test_syntax_error() {
        let mut sink = GraphCollectorSink::new();
        let err = parse_into(
            "<http://ex/s> <http://ex/p> .".as_bytes(),
            RdfFormat::NTriples,
            None,
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }
}
