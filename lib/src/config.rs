//! Defines the configuration of a conversion run: which predicates mark lists,
//! where to read and write, and in which syntaxes.

use anyhow::{anyhow, Result};
use derive_builder::Builder;
use oxigraph::io::{JsonLdProfileSet, RdfFormat};
use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Config {
    /// IRIs of the predicates whose objects are lists to convert
    #[serde(default)]
    #[builder(default)]
    pub predicates: Vec<String>,
    // None reads from stdin
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub input: Option<PathBuf>,
    // None writes to stdout
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub output: Option<PathBuf>,
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub input_syntax: Option<String>,
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub output_syntax: Option<String>,
    // base for relative IRIs in the input
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    pub base_iri: Option<String>,
    // report the overall processing time
    #[serde(default)]
    #[builder(default)]
    pub time: bool,
}

impl ConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        check_predicates(self.predicates.as_deref().unwrap_or_default())
    }
}

fn check_predicates(predicates: &[String]) -> std::result::Result<(), String> {
    if predicates.is_empty() {
        return Err("No predicate URIs specified.".to_string());
    }
    for p in predicates {
        if NamedNode::new(p.as_str()).is_err() {
            return Err(format!(
                "One of the given predicate URIs does not seem to be a URI ({})",
                p
            ));
        }
    }
    Ok(())
}

/// Resolves a syntax name, file extension or media type to a format.
pub fn parse_syntax(name: &str) -> Option<RdfFormat> {
    match name.to_ascii_lowercase().as_str() {
        "turtle" | "ttl" => Some(RdfFormat::Turtle),
        "ntriples" | "n-triples" | "nt" => Some(RdfFormat::NTriples),
        "nquads" | "n-quads" | "nq" => Some(RdfFormat::NQuads),
        "trig" => Some(RdfFormat::TriG),
        "rdfxml" | "rdf/xml" | "xml" | "rdf" | "owl" => Some(RdfFormat::RdfXml),
        "n3" => Some(RdfFormat::N3),
        "jsonld" | "json-ld" => Some(RdfFormat::JsonLd {
            profile: JsonLdProfileSet::default(),
        }),
        other => RdfFormat::from_media_type(other),
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        check_predicates(&self.predicates).map_err(|e| anyhow!(e))
    }

    /// The marker predicates as IRIs
    pub fn marker_predicates(&self) -> Result<HashSet<NamedNode>> {
        self.predicates
            .iter()
            .map(|p| {
                NamedNode::new(p.as_str()).map_err(|_| {
                    anyhow!(
                        "One of the given predicate URIs does not seem to be a URI ({})",
                        p
                    )
                })
            })
            .collect()
    }

    /// Syntax of the input: the configured name, else a guess from the input
    /// file's extension. Reading stdin requires an explicit syntax.
    pub fn input_format(&self) -> Result<RdfFormat> {
        if let Some(syntax) = &self.input_syntax {
            return parse_syntax(syntax)
                .ok_or_else(|| anyhow!("Cannot determine the syntax from '{}'", syntax));
        }
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| anyhow!("Input syntax must be specified when reading from stdin."))?;
        input
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(parse_syntax)
            .ok_or_else(|| anyhow!("Cannot guess the input syntax for the given input file."))
    }

    /// Syntax of the output, Turtle unless configured
    pub fn output_format(&self) -> Result<RdfFormat> {
        match &self.output_syntax {
            Some(syntax) => parse_syntax(syntax)
                .ok_or_else(|| anyhow!("Cannot determine the output syntax from '{}'", syntax)),
            None => Ok(RdfFormat::Turtle),
        }
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Predicates:");
        for p in &self.predicates {
            println!("    - {}", p);
        }
        match &self.input {
            Some(input) => println!("  Input: {}", input.display()),
            None => println!("  Input: <stdin>"),
        }
        match &self.output {
            Some(output) => println!("  Output: {}", output.display()),
            None => println!("  Output: <stdout>"),
        }
        if let Some(syntax) = &self.input_syntax {
            println!("  Input Syntax: {}", syntax);
        }
        if let Some(syntax) = &self.output_syntax {
            println!("  Output Syntax: {}", syntax);
        }
        if let Some(base) = &self.base_iri {
            println!("  Base IRI: {}", base);
        }
        println!("  Time: {}", self.time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ConfigBuilder {
        let mut builder = Config::builder();
        builder.predicates(vec!["http://example.org/hasList".to_string()]);
        builder
    }

    #[test]
    fn test_builder_requires_predicates() {
        let err = Config::builder().build().unwrap_err();
        assert!(err.to_string().contains("No predicate URIs specified."));
    }

    #[test]
    fn test_builder_rejects_invalid_iri() {
        let err = Config::builder()
            .predicates(vec!["not an iri".to_string()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("does not seem to be a URI"));
    }

    #[test]
    fn test_input_format_from_name() {
        let config = base().input_syntax("TTL").build().unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::Turtle);
        let config = base().input_syntax("N-Triples").build().unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::NTriples);
        let config = base().input_syntax("text/turtle").build().unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::Turtle);
        let config = base().input_syntax("bogus").build().unwrap();
        assert!(config.input_format().is_err());
    }

    #[test]
    fn test_input_format_from_extension() {
        let config = base().input("data/lists.nt").build().unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::NTriples);
        let config = base().input("data/lists.rdf").build().unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::RdfXml);
        let config = base().input("data/lists.unknown").build().unwrap();
        assert!(config
            .input_format()
            .unwrap_err()
            .to_string()
            .contains("Cannot guess"));
        // explicit syntax wins over the extension
        let config = base()
            .input("data/lists.nt")
            .input_syntax("turtle")
            .build()
            .unwrap();
        assert_eq!(config.input_format().unwrap(), RdfFormat::Turtle);
    }

    #[test]
    fn test_stdin_requires_syntax() {
        let config = base().build().unwrap();
        assert!(config
            .input_format()
            .unwrap_err()
            .to_string()
            .contains("when reading from stdin"));
    }

    #[test]
    fn test_output_format_defaults_to_turtle() {
        let config = base().build().unwrap();
        assert_eq!(config.output_format().unwrap(), RdfFormat::Turtle);
        let config = base().output_syntax("nt").build().unwrap();
        assert_eq!(config.output_format().unwrap(), RdfFormat::NTriples);
    }

    #[test]
    fn test_marker_predicates() {
        let config = base().build().unwrap();
        let predicates = config.marker_predicates().unwrap();
        assert_eq!(predicates.len(), 1);
        assert!(predicates.contains(&NamedNode::new("http://example.org/hasList").unwrap()));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = base()
            .input("in.ttl")
            .output("out.nt")
            .output_syntax("ntriples")
            .time(true)
            .build()
            .unwrap();
        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"predicates": ["http://example.org/p"]}"#).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.predicates, vec!["http://example.org/p".to_string()]);
        assert_eq!(loaded.input, None);
        assert!(!loaded.time);
        loaded.validate().unwrap();
    }
}
