/// Grammar Linter: validates poem grammar files.
///
/// Usage: grammar_linter [<grammar.ron | dir>...] [--builtin]
use clap::Parser;
use poetry_engine::core::grammar::Grammar;
use poetry_engine::schema::pos::TagInventory;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "grammar_linter", about = "Validate poem grammar files")]
struct Args {
    /// Grammar files or directories of .ron grammars, each linted on its own.
    paths: Vec<PathBuf>,
    /// Also lint the built-in free-form and haiku grammars.
    #[arg(long)]
    builtin: bool,
}

fn main() {
    let args = Args::parse();

    let mut grammars: Vec<(String, Grammar)> = Vec::new();
    if args.builtin || args.paths.is_empty() {
        for (name, loaded) in [("free_form", Grammar::free_form()), ("haiku", Grammar::haiku())] {
            match loaded {
                Ok(g) => grammars.push((format!("<built-in {}>", name), g)),
                Err(e) => {
                    eprintln!("ERROR: Failed to load built-in {} grammar: {}", name, e);
                    process::exit(1);
                }
            }
        }
    }

    for path in &args.paths {
        if path.is_file() {
            load_grammar(path, &mut grammars);
        } else if path.is_dir() {
            load_grammars_recursive(path, &mut grammars);
        } else {
            eprintln!("ERROR: Path '{}' does not exist", path.display());
            process::exit(1);
        }
    }

    let inventory = TagInventory::penn();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for (name, grammar) in &grammars {
        println!("\n=== {} ({} rules) ===\n", name, grammar.rules.len());
        let (errors, warnings) = lint_grammar(grammar, &inventory);

        if errors.is_empty() && warnings.is_empty() {
            println!("All checks passed!");
        }
        for warning in &warnings {
            println!("WARNING: {}", warning);
        }
        for error in &errors {
            println!("ERROR: {}", error);
        }
        total_errors += errors.len();
        total_warnings += warnings.len();
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        total_errors, total_warnings
    );

    if total_errors > 0 {
        process::exit(1);
    }
}

fn load_grammar(path: &Path, grammars: &mut Vec<(String, Grammar)>) {
    match Grammar::load_from_ron(path) {
        Ok(g) => {
            println!("  Loaded: {}", path.display());
            grammars.push((path.display().to_string(), g));
        }
        Err(e) => {
            eprintln!("  ERROR loading {}: {}", path.display(), e);
        }
    }
}

fn load_grammars_recursive(dir: &Path, grammars: &mut Vec<(String, Grammar)>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_grammars_recursive(&path, grammars);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                load_grammar(&path, grammars);
            }
        }
    }
}

fn lint_grammar(grammar: &Grammar, inventory: &TagInventory) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !grammar.rules.contains_key(&grammar.start) {
        errors.push(format!("Start symbol '{}' has no rule", grammar.start));
    }

    let names: BTreeSet<&str> = grammar.rules.keys().map(String::as_str).collect();

    for name in &names {
        let alternatives = grammar.alternatives(name);

        if alternatives.is_empty() {
            errors.push(format!("Rule '{}' has no alternatives", name));
        } else if alternatives.len() == 1 {
            warnings.push(format!("Rule '{}' has only one alternative", name));
        }

        for template in alternatives {
            for reference in template.rule_refs() {
                if !grammar.rules.contains_key(reference) {
                    errors.push(format!(
                        "Rule '{}' references non-existent rule '{}'",
                        name, reference
                    ));
                }
            }

            // An all-caps token that is not a tag is probably a typo or a
            // missing {braces} around a rule name.
            for token in template.terminals() {
                let looks_like_symbol = token.chars().any(|c| c.is_ascii_uppercase())
                    && token.chars().all(|c| c.is_ascii_uppercase() || c == '$')
                    && token != "I";
                if looks_like_symbol && inventory.lookup(token).is_none() {
                    if names.contains(token) {
                        warnings.push(format!(
                            "Rule '{}' uses '{}' as a word; did you mean '{{{}}}'?",
                            name, token, token
                        ));
                    } else {
                        warnings.push(format!(
                            "Rule '{}' has uppercase word '{}' that is not a tag",
                            name, token
                        ));
                    }
                }
            }
        }

        // Every alternative recursing into the rule itself never terminates.
        let all_self_ref = !alternatives.is_empty()
            && alternatives
                .iter()
                .all(|t| t.rule_refs().any(|r| r == *name));
        if all_self_ref {
            errors.push(format!(
                "Rule '{}' has no non-recursive alternative (infinite recursion)",
                name
            ));
        }
    }

    for name in unreachable_rules(grammar) {
        warnings.push(format!(
            "Rule '{}' is unreachable from start symbol '{}'",
            name, grammar.start
        ));
    }

    (errors, warnings)
}

fn unreachable_rules(grammar: &Grammar) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![grammar.start.as_str()];
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        for template in grammar.alternatives(name) {
            stack.extend(template.rule_refs());
        }
    }

    let mut unreachable: Vec<String> = grammar
        .rules
        .keys()
        .filter(|name| !seen.contains(name.as_str()))
        .cloned()
        .collect();
    unreachable.sort();
    unreachable
}
