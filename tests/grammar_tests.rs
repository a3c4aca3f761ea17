/// Grammar loading and expansion integration tests.

use poetry_engine::core::grammar::{Grammar, GrammarError};
use poetry_engine::schema::poem::PoemKind;
use poetry_engine::schema::pos::TagInventory;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn free_form_grammar_loads() {
    let g = Grammar::load_from_ron(std::path::Path::new("grammar_data/free_form.ron")).unwrap();
    assert_eq!(g.start, "S");

    let expected_rules = [
        "S", "NPS", "NPP", "VING", "SM", "VPS", "NPO", "VPO", "PM", "VPP", "INP",
    ];
    for rule_name in &expected_rules {
        assert!(g.rules.contains_key(*rule_name), "Missing rule: {}", rule_name);
    }
    assert_eq!(g, Grammar::free_form().unwrap());
}

#[test]
fn haiku_grammar_has_three_shapes() {
    let g = Grammar::for_kind(PoemKind::Haiku).unwrap();
    assert_eq!(g.rules.len(), 1);
    assert_eq!(g.alternatives("S").len(), 3);
}

#[test]
fn built_in_grammars_have_no_broken_references() {
    for g in [Grammar::free_form().unwrap(), Grammar::haiku().unwrap()] {
        for (name, alternatives) in &g.rules {
            for template in alternatives {
                for reference in template.rule_refs() {
                    assert!(
                        g.rules.contains_key(reference),
                        "Rule '{}' references missing rule '{}'",
                        name,
                        reference
                    );
                }
            }
        }
    }
}

#[test]
fn built_in_uppercase_words_are_tags() {
    let inventory = TagInventory::penn();
    for g in [Grammar::free_form().unwrap(), Grammar::haiku().unwrap()] {
        for alternatives in g.rules.values() {
            for template in alternatives {
                for token in template.terminals() {
                    let all_caps = token.chars().all(|c| c.is_ascii_uppercase());
                    if all_caps && token != "I" {
                        assert!(
                            inventory.lookup(token).is_some(),
                            "Uppercase word '{}' is not a tag",
                            token
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn free_form_expansions_terminate() {
    let g = Grammar::free_form().unwrap();
    let mut expanded = 0;
    for seed in 0..200 {
        let mut rng = StdRng::seed_from_u64(seed);
        match g.expand_start(&mut rng) {
            Ok(tokens) => {
                assert!(!tokens.is_empty());
                assert!(tokens.iter().all(|t| !t.contains('{')));
                expanded += 1;
            }
            Err(GrammarError::DepthExceeded { .. }) => {}
            Err(e) => panic!("unexpected grammar error: {}", e),
        }
    }
    assert!(expanded > 150, "only {} of 200 expansions finished", expanded);
}

#[test]
fn fixture_grammar_expands_to_known_lines() {
    let g = Grammar::load_from_ron(std::path::Path::new("tests/fixtures/test_grammar.ron"))
        .unwrap();
    let subjects = ["the NN", "the JJ NNS", "it"];
    let mut seen = std::collections::HashSet::new();

    for seed in 0..300 {
        let mut rng = StdRng::seed_from_u64(seed);
        let line = g.expand_start(&mut rng).unwrap().join(" ");
        let known = subjects.iter().any(|subject| {
            [
                format!("{} VBD IN the NN", subject),
                format!("{} VBD RP", subject),
                format!("{} was VBG", subject),
            ]
            .contains(&line)
        });
        assert!(known, "unexpected line '{}'", line);
        seen.insert(line);
    }
    // 3 subjects x 3 predicates.
    assert_eq!(seen.len(), 9);
}
