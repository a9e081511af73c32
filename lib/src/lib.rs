//! cdt-lists: rewrite RDF collections into SPARQL-CDT list literals.
//!
//! A [`ListConverter`] sits between a triple producer and a [`TripleSink`].
//! Ordinary triples stream through; triples whose predicate is one of the
//! configured marker predicates have their `rdf:first`/`rdf:rest` chain
//! replaced by one `cdt:List` literal when the stream finishes.
//!
//! ```
//! use cdt_lists::{parse_into, GraphCollectorSink, ListConverter};
//! use oxigraph::io::RdfFormat;
//! use oxigraph::model::NamedNode;
//!
//! let data = "<http://example.org/a> <http://example.org/hasList> (1 2 3) .";
//! let predicate = NamedNode::new("http://example.org/hasList").unwrap();
//! let mut converter = ListConverter::for_predicate(predicate, GraphCollectorSink::new());
//! parse_into(data.as_bytes(), RdfFormat::Turtle, None, &mut converter).unwrap();
//!
//! let triples = converter.into_sink().into_triples();
//! assert_eq!(triples.len(), 1);
//! ```

pub mod codec;
pub mod config;
pub mod consts;
pub mod converter;
pub mod errors;
pub mod sink;
pub mod source;
pub mod util;

pub use codec::{CdtListCodec, ListCodec};
pub use config::Config;
pub use converter::{ConversionStats, ListConverter};
pub use errors::ConvertError;
pub use sink::{GraphCollectorSink, TripleSink, WriterSink};
pub use source::parse_into;

/// Initializes logging for the cdt-lists library.
///
/// If `CDT_LISTS_LOG` is set, `RUST_LOG` is set to its value, so it takes
/// precedence over `RUST_LOG`. The logger itself (e.g. `env_logger::init()`)
/// must be initialized after this call for the level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("CDT_LISTS_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}
