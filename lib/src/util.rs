use anyhow::{Context, Result};

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::time::Instant;

use oxigraph::io::RdfFormat;
use oxigraph::model::NamedNode;

use log::{debug, info};

use crate::config::Config;
use crate::converter::{ConversionStats, ListConverter};
use crate::errors::ConvertError;
use crate::sink::WriterSink;
use crate::source::parse_into;

/// Reads `reader`, rewrites the lists marked by `predicates` and writes the
/// result to `writer`.
pub fn convert_reader_to_writer<R: Read, W: Write>(
    reader: R,
    input_format: RdfFormat,
    base_iri: Option<&str>,
    predicates: HashSet<NamedNode>,
    writer: W,
    output_format: RdfFormat,
) -> Result<ConversionStats, ConvertError> {
    let sink = WriterSink::new(output_format, writer);
    let mut converter = ListConverter::new(predicates, sink);
    parse_into(reader, input_format, base_iri, &mut converter)?;
    Ok(converter.stats().clone())
}

/// Runs the conversion described by `config`.
pub fn convert(config: &Config) -> Result<ConversionStats> {
    let input_format = config.input_format()?;
    let output_format = config.output_format()?;
    let predicates = config.marker_predicates()?;
    debug!(
        "Converting {} to {} for {} predicates",
        input_format.name(),
        output_format.name(),
        predicates.len()
    );

    let reader: Box<dyn Read> = match &config.input {
        Some(path) => {
            let file = File::open(path).with_context(|| {
                format!(
                    "There is a problem with the specified input file ({})",
                    path.display()
                )
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &config.output {
        Some(path) => {
            let file = File::create(path).with_context(|| {
                format!(
                    "There is a problem with the specified output file ({})",
                    path.display()
                )
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let start = Instant::now();
    let stats = convert_reader_to_writer(
        reader,
        input_format,
        config.base_iri.as_deref(),
        predicates,
        writer,
        output_format,
    )?;
    let elapsed = start.elapsed();
    info!(
        "Converted {} lists with {} elements in {:.3}s",
        stats.lists_converted,
        stats.list_elements,
        elapsed.as_secs_f64()
    );
    if config.time {
        eprintln!(
            "Overall Processing Time: {:.3} sec",
            elapsed.as_secs_f64()
        );
    }
    Ok(stats)
}
