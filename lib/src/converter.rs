//! Rewrites RDF collections hanging off selected predicates into CDT list literals.
//!
//! Triples stream through [`ListConverter`] unchanged unless they are part of a
//! collection (`rdf:first`, `rdf:rest`, `rdf:type rdf:List`) or use one of the
//! marker predicates. Those are held back until `finish`, when every marker
//! triple gets its list rebuilt and replaced by a single composite value.
//! Collection triples that no marker triple reached are emitted unchanged.

use crate::codec::{CdtListCodec, ListCodec};
use crate::consts::{FIRST, LIST, NIL, REST, TYPE};
use crate::errors::ConvertError;
use crate::sink::TripleSink;
use log::{debug, info};
use oxigraph::model::{NamedNode, NamedNodeRef, NamedOrBlankNode, Quad, Term, Triple};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Counters for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Triples forwarded as they arrived
    pub passthrough: usize,
    pub lists_converted: usize,
    /// Elements across all converted lists
    pub list_elements: usize,
    /// Collection triples re-emitted because no marker triple consumed them
    pub leftovers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Streaming,
    Done,
}

pub struct ListConverter<S: TripleSink, C: ListCodec = CdtListCodec> {
    predicates: HashSet<NamedNode>,
    sink: S,
    codec: C,
    state: State,
    /// marker triples, popped in reverse arrival order
    heads: Vec<Triple>,
    declared: HashSet<NamedOrBlankNode>,
    firsts: HashMap<NamedOrBlankNode, Term>,
    rests: HashMap<NamedOrBlankNode, Term>,
    stats: ConversionStats,
}

impl<S: TripleSink> ListConverter<S> {
    pub fn new(predicates: HashSet<NamedNode>, sink: S) -> Self {
        Self::with_codec(predicates, sink, CdtListCodec)
    }

    /// Converter for a single marker predicate
    pub fn for_predicate(predicate: NamedNode, sink: S) -> Self {
        Self::new(HashSet::from([predicate]), sink)
    }
}

impl<S: TripleSink, C: ListCodec> ListConverter<S, C> {
    pub fn with_codec(predicates: HashSet<NamedNode>, sink: S, codec: C) -> Self {
        Self {
            predicates,
            sink,
            codec,
            state: State::Streaming,
            heads: Vec::new(),
            declared: HashSet::new(),
            firsts: HashMap::new(),
            rests: HashMap::new(),
            stats: ConversionStats::default(),
        }
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    fn ensure_streaming(&self) -> Result<(), ConvertError> {
        match self.state {
            State::Streaming => Ok(()),
            State::Done => Err(ConvertError::AlreadyFinished),
        }
    }

    fn observe(&mut self, triple: Triple) -> Result<(), ConvertError> {
        if triple.predicate == FIRST {
            insert_link(&mut self.firsts, FIRST, triple.subject, triple.object)
        } else if triple.predicate == REST {
            insert_link(&mut self.rests, REST, triple.subject, triple.object)
        } else if triple.predicate == TYPE
            && matches!(&triple.object, Term::NamedNode(n) if *n == LIST)
        {
            self.declared.insert(triple.subject);
            Ok(())
        } else if self.predicates.contains(&triple.predicate) {
            self.heads.push(triple);
            Ok(())
        } else {
            self.stats.passthrough += 1;
            self.sink.triple(triple)
        }
    }

    /// Walks the chain starting at the object of `head`, consuming every
    /// collection entry on the way.
    fn collect_elements(&mut self, head: &Triple) -> Result<Vec<Term>, ConvertError> {
        let mut elements = Vec::new();
        let mut current = head.object.clone();
        while !is_nil(&current) {
            let index = elements.len() + 1;
            let position = list_position(&current);
            let (first, rest) = match &position {
                Some(position) => {
                    self.declared.remove(position);
                    (self.firsts.remove(position), self.rests.remove(position))
                }
                None => (None, None),
            };
            let Some(first) = first else {
                return Err(ConvertError::MissingListElement {
                    position: current,
                    index,
                    triple: head.clone(),
                });
            };
            let Some(rest) = rest else {
                return Err(ConvertError::MissingListLink {
                    position: current,
                    index,
                    triple: head.clone(),
                });
            };
            elements.push(first);
            current = rest;
        }
        Ok(elements)
    }

    fn rewrite_lists(&mut self) -> Result<(), ConvertError> {
        while let Some(head) = self.heads.pop() {
            let elements = self.collect_elements(&head)?;
            debug!(
                "Converted list of {} elements for <{}> on {}",
                elements.len(),
                head.predicate.as_str(),
                head.subject
            );
            self.stats.lists_converted += 1;
            self.stats.list_elements += elements.len();
            let value = self.codec.encode(&elements);
            self.sink
                .triple(Triple::new(head.subject, head.predicate, value))?;
        }
        Ok(())
    }

    fn emit_leftovers(&mut self) -> Result<(), ConvertError> {
        let mut declared: Vec<NamedOrBlankNode> = self.declared.drain().collect();
        declared.sort_by_cached_key(|n| n.to_string());
        let mut leftovers: Vec<Triple> = declared
            .into_iter()
            .map(|n| Triple::new(n, TYPE, LIST.into_owned()))
            .collect();
        leftovers.extend(drain_sorted(&mut self.firsts, FIRST));
        leftovers.extend(drain_sorted(&mut self.rests, REST));

        if !leftovers.is_empty() {
            debug!("Re-emitting {} unconverted collection triples", leftovers.len());
        }
        self.stats.leftovers += leftovers.len();
        for triple in leftovers {
            self.sink.triple(triple)?;
        }
        Ok(())
    }
}

impl<S: TripleSink, C: ListCodec> TripleSink for ListConverter<S, C> {
    fn base(&mut self, iri: &str) -> Result<(), ConvertError> {
        self.ensure_streaming()?;
        self.sink.base(iri)
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<(), ConvertError> {
        self.ensure_streaming()?;
        self.sink.prefix(prefix, iri)
    }

    fn triple(&mut self, triple: Triple) -> Result<(), ConvertError> {
        self.ensure_streaming()?;
        self.observe(triple)
    }

    fn quad(&mut self, quad: Quad) -> Result<(), ConvertError> {
        self.ensure_streaming()?;
        debug!("Rejecting quad in graph {}", quad.graph_name);
        Err(ConvertError::UnsupportedOperation("quad"))
    }

    fn finish(&mut self) -> Result<(), ConvertError> {
        self.ensure_streaming()?;
        // terminal even if a list turns out to be malformed
        self.state = State::Done;
        debug!(
            "Rebuilding {} lists from {} rdf:first and {} rdf:rest triples",
            self.heads.len(),
            self.firsts.len(),
            self.rests.len()
        );
        self.rewrite_lists()?;
        self.emit_leftovers()?;
        info!(
            "Converted {} lists ({} elements), passed through {} triples, kept {} collection triples",
            self.stats.lists_converted,
            self.stats.list_elements,
            self.stats.passthrough,
            self.stats.leftovers
        );
        self.sink.finish()
    }
}

fn insert_link(
    map: &mut HashMap<NamedOrBlankNode, Term>,
    relation: NamedNodeRef<'_>,
    position: NamedOrBlankNode,
    value: Term,
) -> Result<(), ConvertError> {
    match map.entry(position) {
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
        Entry::Occupied(e) if *e.get() == value => Ok(()),
        Entry::Occupied(e) => Err(ConvertError::ConflictingListStructure {
            position: e.key().clone(),
            relation: relation.into_owned(),
            existing: e.get().clone(),
            conflicting: value,
        }),
    }
}

fn drain_sorted(
    map: &mut HashMap<NamedOrBlankNode, Term>,
    relation: NamedNodeRef<'_>,
) -> Vec<Triple> {
    let mut entries: Vec<(NamedOrBlankNode, Term)> = map.drain().collect();
    entries.sort_by_cached_key(|(k, v)| (k.to_string(), v.to_string()));
    entries
        .into_iter()
        .map(|(k, v)| Triple::new(k, relation, v))
        .collect()
}

fn is_nil(term: &Term) -> bool {
    matches!(term, Term::NamedNode(n) if *n == NIL)
}

/// Literals can never be list positions
fn list_position(term: &Term) -> Option<NamedOrBlankNode> {
    match term {
        Term::NamedNode(n) => Some(n.clone().into()),
        Term::BlankNode(b) => Some(b.clone().into()),
        _ => None,
    }
}
