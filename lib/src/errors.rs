//! Error type shared by the converter, the sinks and the triple source.

use oxigraph::io::RdfParseError;
use oxigraph::model::{IriParseError, NamedNode, NamedOrBlankNode, Term, Triple};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Two different values were asserted for the same list position.
    #[error(
        "One list location ({position}) has multiple {relation} elements ({existing} and {conflicting})."
    )]
    ConflictingListStructure {
        position: NamedOrBlankNode,
        relation: NamedNode,
        existing: Term,
        conflicting: Term,
    },
    /// A position reached while walking a list has no `rdf:first` statement.
    #[error(
        "The list element at position {index} ({position}) in the list of triple ({triple}) has no rdf:first statement."
    )]
    MissingListElement {
        position: Term,
        index: usize,
        triple: Triple,
    },
    /// A position reached while walking a list has no `rdf:rest` statement.
    #[error(
        "The list element at position {index} ({position}) in the list of triple ({triple}) has no rdf:rest statement."
    )]
    MissingListLink {
        position: Term,
        index: usize,
        triple: Triple,
    },
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("The stream has already been finished")]
    AlreadyFinished,
    #[error("Invalid list literal: {0}")]
    InvalidListLiteral(String),
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
    #[error(transparent)]
    Parse(#[from] RdfParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
