//! TripleSink trait for event-driven triple streams
//!
//! A producer (the parser driver in [`crate::source`]) reports base and
//! prefix declarations, then triples, then a single `finish`. Sinks are:
//! - [`GraphCollectorSink`]: keeps everything in memory
//! - [`WriterSink`]: serializes to any `Write` with oxigraph
//! - [`crate::converter::ListConverter`]: rewrites lists and forwards to another sink

use crate::errors::ConvertError;
use log::{debug, warn};
use oxigraph::io::{RdfFormat, RdfSerializer, WriterQuadSerializer};
use oxigraph::model::{Quad, Triple};
use std::io::Write;

/// Receiver of a triple stream.
pub trait TripleSink {
    /// Called when a base IRI is declared
    fn base(&mut self, iri: &str) -> Result<(), ConvertError>;

    /// Called when a prefix is declared
    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError>;

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError>;

    /// Statements in a named graph. Sinks are triple-only unless they say otherwise.
    fn quad(&mut self, _quad: Quad) -> Result<(), ConvertError> {
        Err(ConvertError::UnsupportedOperation("quad"))
    }

    /// Called exactly once after the last statement
    fn finish(&mut self) -> Result<(), ConvertError>;
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn base(&mut self, iri: &str) -> Result<(), ConvertError> {
        (**self).base(iri)
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError> {
        (**self).prefix(prefix, iri)
    }

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError> {
        (**self).triple(triple)
    }

    fn quad(&mut self, quad: Quad) -> Result<(), ConvertError> {
        (**self).quad(quad)
    }

    fn finish(&mut self) -> Result<(), ConvertError> {
        (**self).finish()
    }
}

impl<S: TripleSink + ?Sized> TripleSink for Box<S> {
    fn base(&mut self, iri: &str) -> Result<(), ConvertError> {
        (**self).base(iri)
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError> {
        (**self).prefix(prefix, iri)
    }

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError> {
        (**self).triple(triple)
    }

    fn quad(&mut self, quad: Quad) -> Result<(), ConvertError> {
        (**self).quad(quad)
    }

    fn finish(&mut self) -> Result<(), ConvertError> {
        (**self).finish()
    }
}

/// A sink that collects the stream in memory, in arrival order.
#[derive(Debug, Default)]
pub struct GraphCollectorSink {
    base: Option<String>,
    prefixes: Vec<(String, String)>,
    triples: Vec<Triple>,
    finish_calls: usize,
}

impl GraphCollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Prefix declarations in the order they were received
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }

    pub fn finish_calls(&self) -> usize {
        self.finish_calls
    }

    pub fn is_finished(&self) -> bool {
        self.finish_calls > 0
    }
}

impl TripleSink for GraphCollectorSink {
    fn base(&mut self, iri: &str) -> Result<(), ConvertError> {
        self.base = Some(iri.to_string());
        Ok(())
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError> {
        self.prefixes.push((prefix.to_string(), iri.to_string()));
        Ok(())
    }

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError> {
        self.triples.push(triple);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ConvertError> {
        self.finish_calls += 1;
        Ok(())
    }
}

/// A sink that serializes triples to a writer.
///
/// The oxigraph serializer takes its prefixes up front, so the output is only
/// opened by the first triple (or by `finish`). Prefixes declared before that
/// point end up in the output; later ones are dropped with a warning.
pub struct WriterSink<W: Write> {
    format: RdfFormat,
    pending: Option<(RdfSerializer, W)>,
    active: Option<WriterQuadSerializer<W>>,
    finished: Option<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(format: RdfFormat, writer: W) -> Self {
        Self {
            format,
            pending: Some((RdfSerializer::from_format(format), writer)),
            active: None,
            finished: None,
        }
    }

    /// The underlying writer, once `finish` has flushed it.
    pub fn into_inner(self) -> Option<W> {
        self.finished
    }

    fn serializer(&mut self) -> Result<&mut WriterQuadSerializer<W>, ConvertError> {
        if self.active.is_none() {
            let (serializer, writer) = self.pending.take().ok_or(ConvertError::AlreadyFinished)?;
            debug!("Opening {} output", self.format.name());
            self.active = Some(serializer.for_writer(writer));
        }
        self.active.as_mut().ok_or(ConvertError::AlreadyFinished)
    }
}

impl<W: Write> TripleSink for WriterSink<W> {
    fn base(&mut self, iri: &str) -> Result<(), ConvertError> {
        // output IRIs are always absolute
        debug!("Base IRI {} not applied to output", iri);
        Ok(())
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError> {
        match self.pending.take() {
            Some((serializer, writer)) => {
                let serializer = serializer.with_prefix(prefix, iri)?;
                self.pending = Some((serializer, writer));
                Ok(())
            }
            None if self.finished.is_some() => Err(ConvertError::AlreadyFinished),
            None => {
                warn!(
                    "Prefix {}: <{}> declared after output started; ignoring it",
                    prefix, iri
                );
                Ok(())
            }
        }
    }

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError> {
        self.serializer()?.serialize_triple(triple.as_ref())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ConvertError> {
        self.serializer()?;
        let serializer = self.active.take().ok_or(ConvertError::AlreadyFinished)?;
        let mut writer = serializer.finish()?;
        writer.flush()?;
        self.finished = Some(writer);
        Ok(())
    }
}
