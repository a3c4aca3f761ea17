//! Context-free grammar runtime: template parsing, RON loading, and
//! random expansion.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::poem::PoemKind;

/// Deepest rule nesting allowed in a single expansion.
pub const MAX_EXPANSION_DEPTH: usize = 32;

const FREE_FORM_GRAMMAR: &str = include_str!("../../grammar_data/free_form.ron");
const HAIKU_GRAMMAR: &str = include_str!("../../grammar_data/haiku.ron");

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("no usable alternative for rule '{0}'")]
    NoUsableAlternative(String),
    #[error("expanding '{rule}' went deeper than {limit} levels")]
    DepthExceeded { rule: String, limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal text; split on whitespace into terminal tokens.
    Literal(String),
    /// Reference to another rule: `{RULE}`.
    RuleRef(String),
}

/// One right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{RULE}` → `RuleRef`
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                // Escaped brace
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(literal_buf.clone()));
                    literal_buf.clear();
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(GrammarError::TemplateParse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }
                if end == len {
                    return Err(GrammarError::TemplateParse("unclosed brace".to_string()));
                }

                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(GrammarError::TemplateParse("empty braces".to_string()));
                }
                if name.chars().any(char::is_whitespace) {
                    return Err(GrammarError::TemplateParse(format!(
                        "rule name '{}' contains whitespace",
                        name
                    )));
                }

                segments.push(TemplateSegment::RuleRef(name));
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(GrammarError::TemplateParse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    /// Names of the rules this template refers to, in order.
    pub fn rule_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::RuleRef(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Whitespace-separated terminal tokens of the literal segments.
    pub fn terminals(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                TemplateSegment::Literal(text) => Some(text.split_whitespace()),
                TemplateSegment::RuleRef(_) => None,
            })
            .flatten()
    }
}

/// A start symbol and its production rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub start: String,
    /// Rule name → alternatives. Duplicated alternatives weight the draw.
    pub rules: HashMap<String, Vec<Template>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Grammar")]
struct RonGrammar {
    start: String,
    rules: HashMap<String, Vec<String>>,
}

impl Grammar {
    /// The built-in free-form verse grammar.
    pub fn free_form() -> Result<Grammar, GrammarError> {
        Self::parse_ron(FREE_FORM_GRAMMAR)
    }

    /// The built-in three-shape haiku grammar.
    pub fn haiku() -> Result<Grammar, GrammarError> {
        Self::parse_ron(HAIKU_GRAMMAR)
    }

    pub fn for_kind(kind: PoemKind) -> Result<Grammar, GrammarError> {
        match kind {
            PoemKind::Haiku => Self::haiku(),
            PoemKind::FreeForm => Self::free_form(),
        }
    }

    /// Load a grammar from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Grammar, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a grammar from a RON string.
    pub fn parse_ron(input: &str) -> Result<Grammar, GrammarError> {
        let raw: RonGrammar = ron::from_str(input)?;
        let mut rules = HashMap::new();
        for (name, texts) in raw.rules {
            let templates = texts
                .iter()
                .map(|text| Template::parse(text))
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(name, templates);
        }
        Ok(Grammar {
            start: raw.start,
            rules,
        })
    }

    /// Merge another grammar's rules into this one. Rules from `other`
    /// replace rules of the same name; the start symbol is kept.
    pub fn merge(&mut self, other: Grammar) {
        for (name, alternatives) in other.rules {
            self.rules.insert(name, alternatives);
        }
    }

    pub fn alternatives(&self, rule: &str) -> &[Template] {
        self.rules.get(rule).map(Vec::as_slice).unwrap_or(&[])
    }

    /// An alternative is usable when every rule it refers to has at least
    /// one alternative of its own.
    pub fn is_usable(&self, template: &Template) -> bool {
        template
            .rule_refs()
            .all(|name| !self.alternatives(name).is_empty())
    }

    /// Expand the start symbol.
    pub fn expand_start(&self, rng: &mut StdRng) -> Result<Vec<String>, GrammarError> {
        self.expand(&self.start, rng)
    }

    /// Expand `symbol` into terminal tokens.
    ///
    /// Alternatives are tried in a uniformly shuffled order and the first
    /// usable one is expanded; references are expanded recursively.
    pub fn expand(&self, symbol: &str, rng: &mut StdRng) -> Result<Vec<String>, GrammarError> {
        let mut tokens = Vec::new();
        self.expand_into(symbol, 0, rng, &mut tokens)?;
        Ok(tokens)
    }

    fn expand_into(
        &self,
        symbol: &str,
        depth: usize,
        rng: &mut StdRng,
        out: &mut Vec<String>,
    ) -> Result<(), GrammarError> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(GrammarError::DepthExceeded {
                rule: symbol.to_string(),
                limit: MAX_EXPANSION_DEPTH,
            });
        }

        let mut order: Vec<&Template> = self.alternatives(symbol).iter().collect();
        order.shuffle(rng);
        let chosen = order
            .into_iter()
            .find(|template| self.is_usable(template))
            .ok_or_else(|| GrammarError::NoUsableAlternative(symbol.to_string()))?;

        for segment in &chosen.segments {
            match segment {
                TemplateSegment::Literal(text) => {
                    out.extend(text.split_whitespace().map(str::to_string));
                }
                TemplateSegment::RuleRef(name) => {
                    self.expand_into(name, depth + 1, rng, out)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grammar(start: &str, rules: &[(&str, &[&str])]) -> Grammar {
        Grammar {
            start: start.to_string(),
            rules: rules
                .iter()
                .map(|(name, alts)| {
                    (
                        name.to_string(),
                        alts.iter().map(|a| Template::parse(a).unwrap()).collect(),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("DT JJ NNS").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("DT JJ NNS".to_string())]
        );
    }

    #[test]
    fn parse_rule_refs() {
        let t = Template::parse("{SM} VBN like the JJ NN").unwrap();
        assert_eq!(t.segments.len(), 2);
        assert_eq!(t.segments[0], TemplateSegment::RuleRef("SM".to_string()));
        assert_eq!(t.rule_refs().collect::<Vec<_>>(), vec!["SM"]);
        assert_eq!(
            t.terminals().collect::<Vec<_>>(),
            vec!["VBN", "like", "the", "JJ", "NN"]
        );
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("{TWO WORDS}").is_err());
    }

    #[test]
    fn load_test_grammar_from_ron() {
        let path = std::path::PathBuf::from("tests/fixtures/test_grammar.ron");
        let g = Grammar::load_from_ron(&path).unwrap();
        assert_eq!(g.start, "LINE");
        assert_eq!(g.rules.len(), 3);
        assert_eq!(g.alternatives("SUBJECT").len(), 3);
    }

    #[test]
    fn built_in_grammars_load() {
        let free = Grammar::free_form().unwrap();
        assert_eq!(free.start, "S");
        assert!(free.rules.contains_key("INP"));

        let haiku = Grammar::haiku().unwrap();
        assert_eq!(haiku.rules.len(), 1);
        assert_eq!(haiku.alternatives("S").len(), 3);
    }

    #[test]
    fn expand_is_deterministic_per_seed() {
        let g = Grammar::free_form().unwrap();
        let a = g.expand_start(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = g.expand_start(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn expand_emits_literals_and_tags_verbatim() {
        let g = grammar("S", &[("S", &["{NP} VBD"]), ("NP", &["the NN"])]);
        let tokens = g.expand_start(&mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(tokens, vec!["the", "NN", "VBD"]);
    }

    #[test]
    fn haiku_lines_match_a_production() {
        let g = Grammar::haiku().unwrap();
        let shapes = [
            vec!["DT", "JJ", "NNS"],
            vec!["VBD", "NNS"],
            vec!["NNS", "VBD"],
        ];
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let line = g.expand_start(&mut rng).unwrap();
            assert!(shapes.iter().any(|s| *s == line), "unexpected {:?}", line);
        }
    }

    #[test]
    fn alternative_with_undefined_rule_is_skipped() {
        let g = grammar("S", &[("S", &["{MISSING} NN", "JJ NN"])]);
        for seed in 0..30 {
            let tokens = g.expand_start(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(tokens, vec!["JJ", "NN"]);
        }
    }

    #[test]
    fn validity_is_judged_per_alternative() {
        // Whichever order the shuffle picks, an earlier unusable alternative
        // must not poison the usable ones after it.
        let g = grammar(
            "S",
            &[
                ("S", &["{GONE} a", "{EMPTY} b", "{OK} c"]),
                ("EMPTY", &[]),
                ("OK", &["NN"]),
            ],
        );
        for seed in 0..30 {
            let tokens = g.expand_start(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(tokens, vec!["NN", "c"]);
        }
    }

    #[test]
    fn no_usable_alternative_is_an_error() {
        let g = grammar("S", &[("S", &["{MISSING} NN"])]);
        let err = g.expand_start(&mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, GrammarError::NoUsableAlternative(ref r) if r == "S"));

        let unknown = g.expand("NOPE", &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(unknown, GrammarError::NoUsableAlternative(_)));
    }

    #[test]
    fn endless_recursion_hits_depth_budget() {
        let g = grammar("S", &[("S", &["NN {S}"])]);
        let err = g.expand_start(&mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::DepthExceeded { limit: MAX_EXPANSION_DEPTH, .. }
        ));
    }

    #[test]
    fn merge_precedence() {
        let mut base = grammar("S", &[("S", &["{X}"]), ("X", &["NN"]), ("Y", &["JJ"])]);
        let other = grammar("T", &[("X", &["VBD"])]);
        base.merge(other);

        assert_eq!(base.start, "S");
        assert_eq!(base.alternatives("X")[0], Template::parse("VBD").unwrap());
        assert!(base.rules.contains_key("Y"));
    }
}
