use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    error::ParsingError,
    grammar::{NonTerminal, ProductionRule, Symbol, Terminal},
};

/// The result of reading a grammar description. Symbols are classified
/// but not yet validated, that is the job of the builder.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedGrammar {
    pub rules: Vec<ProductionRule>,
    pub terminals: BTreeSet<Terminal>,
    pub nonterminals: BTreeSet<NonTerminal>,
}

/// Unclassified rule: lhs, rhs tokens and the line it came from
struct RawRule {
    lhs: String,
    rhs: Vec<String>,
    line: usize,
}

fn split_directive<'a>(tokens: &'a [&'a str], path: &Path, line: usize) -> Result<&'a [&'a str], ParsingError> {
    match tokens.get(1) {
        Some(&":=") | Some(&"=") => Ok(&tokens[2..]),
        _ => Err(ParsingError::new(path, line, format!("Expected ':=' after '{}'", tokens[0]))),
    }
}

fn parse_rule(tokens: &[&str], path: &Path, line: usize) -> Result<RawRule, ParsingError> {
    if tokens.len() < 2 || tokens[1] != "->" {
        return Err(ParsingError::new(path, line, format!("Expected a rule of the form 'A -> s1 s2 ...', got '{}'", tokens.join(" "))));
    }

    if tokens[0] == "->" {
        return Err(ParsingError::new(path, line, "Missing left-hand side of rule"));
    }

    if tokens.len() == 2 {
        return Err(ParsingError::new(path, line, format!("Right-hand side of '{}' must not be empty", tokens[0])));
    }

    Ok(RawRule {
        lhs: tokens[0].to_string(),
        rhs: tokens[2..].iter().map(|s| s.to_string()).collect(),
        line,
    })
}

fn is_fallback_terminal(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_lowercase())
}

/// Parse a grammar from any line-oriented reader.
pub fn parse_reader<R: BufRead>(reader: R, path: &Path) -> Result<ParsedGrammar, ParsingError> {
    let mut grammar = ParsedGrammar::default();
    let mut raw_rules = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.map_err(|e| ParsingError::new(path, lineno, e.to_string()))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some(first) = tokens.first() else {
            continue;
        };

        if first.starts_with('#') {
            continue;
        }

        if tokens.get(1) == Some(&"->") {
            raw_rules.push(parse_rule(&tokens, path, lineno)?);
            continue;
        }

        match *first {
            "END" => break,
            "rule" => match tokens.get(1) {
                Some(&"::=") | Some(&":=") => raw_rules.push(parse_rule(&tokens[2..], path, lineno)?),
                _ => return Err(ParsingError::new(path, lineno, "Expected '::=' after 'rule'")),
            },
            "T" | "TLIST" => {
                for term in split_directive(&tokens, path, lineno)? {
                    grammar.terminals.insert(Terminal::new(*term));
                }
            },
            "NT" | "NTLIST" => {
                for nonterm in split_directive(&tokens, path, lineno)? {
                    grammar.nonterminals.insert(NonTerminal::new(*nonterm));
                }
            },
            _ => raw_rules.push(parse_rule(&tokens, path, lineno)?),
        }
    }

    // Classification needs to know all declarations and all defined non-terminals
    let defined: BTreeSet<&str> = raw_rules.iter().map(|rule| rule.lhs.as_str()).collect();

    for raw in &raw_rules {
        if grammar.terminals.contains(&Terminal::new(raw.lhs.as_str())) {
            return Err(ParsingError::new(path, raw.line, format!("Terminal '{}' cannot be the left-hand side of a rule", raw.lhs)));
        }

        let mut symbols = Vec::with_capacity(raw.rhs.len());

        for token in &raw.rhs {
            let term = Terminal::new(token.as_str());

            if grammar.terminals.contains(&term) {
                symbols.push(Symbol::Terminal(term));
            } else if is_fallback_terminal(token) && !defined.contains(token.as_str()) && !grammar.nonterminals.contains(&NonTerminal::new(token.as_str())) {
                grammar.terminals.insert(term.clone());
                symbols.push(Symbol::Terminal(term));
            } else {
                symbols.push(Symbol::non_terminal(token.as_str()));
            }
        }

        grammar.rules.push(ProductionRule::new(NonTerminal::new(raw.lhs.as_str()), symbols));
    }

    Ok(grammar)
}

/// Parse a grammar held in memory.
pub fn parse_str(source: &str) -> Result<ParsedGrammar, ParsingError> {
    parse_reader(source.as_bytes(), Path::new("<string>"))
}

/// Parse a grammar file from disk.
pub fn parse_file(path: &Path) -> Result<ParsedGrammar, ParsingError> {
    let file = File::open(path).map_err(|e| ParsingError::new(path, 0, format!("Could not open file: {}", e)))?;
    parse_reader(BufReader::new(file), path)
}
