//! Recursive-descent parsing with backtracking (§4.3): turns a [`Tokenizer`]
//! stream into an [`Ast`].
//!
//! ```text
//! regex          := alternation EndOfInput
//! alternation     := concatenation ('|' concatenation)*
//! concatenation   := repeat_atom*
//! repeat_atom     := atom ('*' | '+' | '?' | '{' count '}')?
//! count           := int | int ',' | int ',' int
//! atom            := literal | '.' | shorthand | anchor | backreference
//!                  | class | group
//! class           := '[' '^'? class_atom* ']'
//! group           := '(' alternation ')'
//!                  | '(?:' alternation ')'
//!                  | '(?=' alternation ')'
//! ```

use crate::ast::Ast;
use crate::character_block::CharacterBlock;
use crate::errors::{Result, RegexParseError};
use crate::token::{Token, Tokenizer};

pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    next_group: usize,
    open_groups: Vec<usize>,
    lookahead_ids: Vec<u64>,
    next_lookahead_id: u64,
    group_lookahead_stack: std::collections::HashMap<usize, Vec<u64>>,
}

pub struct ParseOutcome {
    pub ast: Ast,
    pub group_count: usize,
}

pub fn parse(source: &str) -> Result<ParseOutcome> {
    let mut parser = Parser {
        tokenizer: Tokenizer::new(source),
        next_group: 1,
        open_groups: Vec::new(),
        lookahead_ids: Vec::new(),
        next_lookahead_id: 0,
        group_lookahead_stack: std::collections::HashMap::new(),
    };
    let ast = parser.parse_alternation()?;
    let (tok, offset) = parser.tokenizer.next_with_offset();
    if tok != Token::EndOfInput {
        return Err(parser.err(offset, format!("unexpected trailing token {:?}", tok)));
    }
    Ok(ParseOutcome {
        ast,
        group_count: parser.next_group - 1,
    })
}

impl<'a> Parser<'a> {
    fn err(&self, offset: usize, message: impl Into<String>) -> crate::errors::Error {
        RegexParseError {
            message: message.into(),
            source: self.tokenizer.source().to_string(),
            byte_offset: offset,
        }
        .into()
    }

    fn parse_alternation(&mut self) -> Result<Ast> {
        let mut ast = self.parse_concatenation()?;
        while self.tokenizer.peek() == Token::Or {
            self.tokenizer.next();
            let rhs = self.parse_concatenation()?;
            ast = Ast::Union(Box::new(ast), Box::new(rhs));
        }
        Ok(ast)
    }

    fn parse_concatenation(&mut self) -> Result<Ast> {
        let mut ast: Option<Ast> = None;
        loop {
            match self.tokenizer.peek() {
                Token::Or | Token::GroupClose | Token::EndOfInput => break,
                _ => {
                    let atom = self.parse_repeat_atom()?;
                    ast = Some(match ast {
                        None => atom,
                        Some(prev) => Ast::Concat(Box::new(prev), Box::new(atom)),
                    });
                }
            }
        }
        Ok(ast.unwrap_or(Ast::Epsilon))
    }

    fn parse_repeat_atom(&mut self) -> Result<Ast> {
        let atom = self.parse_atom()?;
        self.parse_repeat_suffix(atom)
    }

    fn parse_repeat_suffix(&mut self, atom: Ast) -> Result<Ast> {
        match self.tokenizer.peek() {
            Token::Kleene => {
                self.tokenizer.next();
                Ok(Ast::Repeat {
                    child: Box::new(atom),
                    min: 0,
                    max: None,
                })
            }
            Token::Plus => {
                self.tokenizer.next();
                Ok(Ast::Repeat {
                    child: Box::new(atom),
                    min: 1,
                    max: None,
                })
            }
            Token::Question => {
                self.tokenizer.next();
                Ok(Ast::Repeat {
                    child: Box::new(atom),
                    min: 0,
                    max: Some(1),
                })
            }
            Token::RepOpen => self.parse_counted_repeat(atom),
            _ => Ok(atom),
        }
    }

    fn parse_counted_repeat(&mut self, atom: Ast) -> Result<Ast> {
        let (_, open_offset) = self.tokenizer.next_with_offset(); // consume '{'
        let n = self.expect_rep_int(open_offset)?;
        match self.tokenizer.peek() {
            Token::RepClose => {
                self.tokenizer.next();
                Ok(Ast::Repeat {
                    child: Box::new(atom),
                    min: n,
                    max: Some(n),
                })
            }
            Token::RepComma => {
                self.tokenizer.next();
                match self.tokenizer.peek() {
                    Token::RepClose => {
                        self.tokenizer.next();
                        Ok(Ast::Repeat {
                            child: Box::new(atom),
                            min: n,
                            max: None,
                        })
                    }
                    Token::RepInt(m) => {
                        let (_, m_offset) = self.tokenizer.next_with_offset();
                        if m < n {
                            return Err(self.err(
                                m_offset,
                                format!("repetition {{{},{}}} has max < min", n, m),
                            ));
                        }
                        self.expect(Token::RepClose)?;
                        Ok(Ast::Repeat {
                            child: Box::new(atom),
                            min: n,
                            max: Some(m),
                        })
                    }
                    _ => {
                        let (tok, offset) = self.tokenizer.next_with_offset();
                        Err(self.err(
                            offset,
                            format!("expected integer or '}}' in repetition, found {:?}", tok),
                        ))
                    }
                }
            }
            _ => {
                let (tok, offset) = self.tokenizer.next_with_offset();
                Err(self.err(
                    offset,
                    format!("expected ',' or '}}' in repetition, found {:?}", tok),
                ))
            }
        }
    }

    fn expect_rep_int(&mut self, context_offset: usize) -> Result<usize> {
        match self.tokenizer.next_with_offset() {
            (Token::RepInt(n), _) => Ok(n),
            (tok, offset) => Err(self.err(
                offset.max(context_offset),
                format!("expected integer after '{{', found {:?}", tok),
            )),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let (tok, offset) = self.tokenizer.next_with_offset();
        if tok == expected {
            Ok(())
        } else {
            Err(self.err(offset, format!("expected {:?}, found {:?}", expected, tok)))
        }
    }

    fn parse_atom(&mut self) -> Result<Ast> {
        let (tok, offset) = self.tokenizer.next_with_offset();
        match tok {
            Token::Char(c) => Ok(Ast::CharBlock(CharacterBlock::Single(c))),
            Token::Dot => Ok(Ast::CharBlock(CharacterBlock::Dot)),
            Token::Shorthand(k) => Ok(Ast::CharBlock(CharacterBlock::Shorthand(k))),
            Token::StartAnchor => Ok(Ast::StartAnchor),
            Token::EndAnchor => Ok(Ast::EndAnchor),
            Token::WordBoundary => Ok(Ast::WordBoundary),
            Token::NotWordBoundary => Ok(Ast::NotWordBoundary),
            Token::Backreference(n) => self.parse_backreference(n, offset),
            Token::ClassOpen => self.parse_class(),
            Token::GroupOpen => self.parse_group(offset),
            Token::NonCapturingGroupOpen => self.parse_non_capturing_group(offset),
            Token::LookaheadOpen => self.parse_lookahead(offset),
            Token::Invalid(msg) => Err(self.err(offset, msg)),
            other => Err(self.err(offset, format!("unexpected token {:?}", other))),
        }
    }

    fn parse_backreference(&mut self, n: u8, offset: usize) -> Result<Ast> {
        let number = n as usize;
        if number == 0 || number >= self.next_group {
            return Err(self.err(
                offset,
                format!("backreference \\{} has no preceding capturing group", n),
            ));
        }
        if self.open_groups.contains(&number) {
            return Err(self.err(
                offset,
                format!("backreference \\{} references its own enclosing group", n),
            ));
        }
        let target_stack = self
            .group_lookahead_stack
            .get(&number)
            .cloned()
            .unwrap_or_default();
        let active = &self.lookahead_ids;
        let still_enclosed = active.len() >= target_stack.len()
            && active[..target_stack.len()] == target_stack[..];
        if !target_stack.is_empty() && !still_enclosed {
            return Err(self.err(
                offset,
                format!(
                    "backreference \\{} crosses out of the lookahead that captured it",
                    n
                ),
            ));
        }
        Ok(Ast::Backreference(n))
    }

    fn parse_group(&mut self, open_offset: usize) -> Result<Ast> {
        let number = self.next_group;
        self.next_group += 1;
        self.group_lookahead_stack
            .insert(number, self.lookahead_ids.clone());
        self.open_groups.push(number);
        let child = self.parse_alternation()?;
        self.open_groups.pop();
        self.expect_group_close(open_offset)?;
        Ok(Ast::Capture {
            number,
            child: Box::new(child),
        })
    }

    fn parse_non_capturing_group(&mut self, open_offset: usize) -> Result<Ast> {
        let child = self.parse_alternation()?;
        self.expect_group_close(open_offset)?;
        Ok(Ast::NonCapture(Box::new(child)))
    }

    fn parse_lookahead(&mut self, open_offset: usize) -> Result<Ast> {
        let id = self.next_lookahead_id;
        self.next_lookahead_id += 1;
        self.lookahead_ids.push(id);
        let child = self.parse_alternation()?;
        self.lookahead_ids.pop();
        self.expect_group_close(open_offset)?;
        Ok(Ast::Lookahead(Box::new(child)))
    }

    fn expect_group_close(&mut self, open_offset: usize) -> Result<()> {
        let (tok, offset) = self.tokenizer.next_with_offset();
        if tok == Token::GroupClose {
            Ok(())
        } else {
            Err(self.err(
                offset,
                format!(
                    "unterminated group opened at byte {}, found {:?}",
                    open_offset, tok
                ),
            ))
        }
    }

    fn parse_class(&mut self) -> Result<Ast> {
        self.tokenizer.enter_class();
        let mut negated = false;
        if self.tokenizer.peek() == Token::ClassNegate {
            self.tokenizer.next();
            negated = true;
        }
        let mut blocks = Vec::new();
        loop {
            match self.tokenizer.peek() {
                Token::ClassClose => {
                    self.tokenizer.next();
                    break;
                }
                Token::EndOfInput => {
                    self.tokenizer.exit_class();
                    return Err(self.err(self.tokenizer.source().len(), "unterminated character class"));
                }
                _ => blocks.push(self.parse_class_atom()?),
            }
        }
        self.tokenizer.exit_class();
        if blocks.is_empty() {
            return Err(self.err(0, "empty character class"));
        }
        Ok(Ast::CharBlock(CharacterBlock::BracketClass { negated, blocks }))
    }

    fn parse_class_atom(&mut self) -> Result<CharacterBlock> {
        let (tok, offset) = self.tokenizer.next_with_offset();
        match tok {
            Token::Char(c) => {
                if self.tokenizer.peek() == Token::RangeDash {
                    let (_, dash_offset) = self.tokenizer.next_with_offset();
                    match self.tokenizer.peek() {
                        Token::Char(d) => {
                            let (_, d_offset) = self.tokenizer.next_with_offset();
                            if d < c {
                                return Err(self.err(
                                    d_offset,
                                    format!("character range '{}-{}' is backwards", c, d),
                                ));
                            }
                            Ok(CharacterBlock::Range(c, d))
                        }
                        _ => {
                            self.tokenizer.push_back(Token::Char('-'), dash_offset);
                            Ok(CharacterBlock::Single(c))
                        }
                    }
                } else {
                    Ok(CharacterBlock::Single(c))
                }
            }
            Token::RangeDash => Ok(CharacterBlock::Single('-')),
            Token::Shorthand(k) => Ok(CharacterBlock::Shorthand(k)),
            Token::Invalid(msg) => Err(self.err(offset, msg)),
            other => Err(self.err(offset, format!("unexpected token {:?} in character class", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_concatenation() {
        let outcome = parse("cat").unwrap();
        assert_eq!(outcome.group_count, 0);
        assert_eq!(outcome.ast.to_string(), "cat");
    }

    #[test]
    fn parses_union_and_group_numbering() {
        let outcome = parse("(A|B)(C)").unwrap();
        assert_eq!(outcome.group_count, 2);
    }

    #[test]
    fn rejects_backwards_counted_repetition() {
        assert!(parse("a{5,2}").is_err());
    }

    #[test]
    fn accepts_equal_bound_counted_repetition() {
        assert!(parse("a{3,3}").is_ok());
    }

    #[test]
    fn rejects_unknown_backreference() {
        assert!(parse("(A)\\2").is_err());
    }

    #[test]
    fn rejects_backreference_to_zero() {
        assert!(parse("(A)\\0").is_err());
    }

    #[test]
    fn rejects_self_referencing_group() {
        // \1 names its own enclosing group -- no preceding capture to copy.
        assert!(parse("(A\\1)").is_err());
    }

    #[test]
    fn accepts_backreference_inside_its_own_lookahead() {
        // The backreference stays inside the lookahead that captured it.
        assert!(parse("(A)(?=\\1)").is_ok());
    }

    #[test]
    fn rejects_backreference_crossing_out_of_lookahead() {
        // \1 is defined inside the lookahead and used outside it.
        assert!(parse("(?=(A))\\1").is_err());
    }

    #[test]
    fn rejects_unterminated_group() {
        assert!(parse("(A").is_err());
    }

    #[test]
    fn rejects_unterminated_class() {
        assert!(parse("[AB").is_err());
    }

    #[test]
    fn rejects_empty_class() {
        assert!(parse("[]").is_err());
    }

    #[test]
    fn rejects_dangling_backslash() {
        assert!(parse("a\\").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("a)").is_err());
    }

    #[test]
    fn non_capturing_group_does_not_consume_a_group_number() {
        let outcome = parse("(?:A)(B)").unwrap();
        assert_eq!(outcome.group_count, 1);
    }

    #[test]
    fn class_range_backwards_is_rejected() {
        assert!(parse("[z-a]").is_err());
    }

    #[test]
    fn dash_at_class_boundary_is_literal() {
        // No character follows the '-', so it's a literal dash, not a range.
        assert!(parse("[a-]").is_ok());
    }

    /// spec §8 Property 3: re-parsing a regex's own rendered `to_string()`
    /// yields the same optimized tree as the original.
    fn round_trips(source: &str) {
        let first = crate::optimizer::optimize(
            parse(source).unwrap().ast,
            crate::optimizer::OptimizerFlags::ALL,
        );
        let rendered = first.to_string();
        let second = crate::optimizer::optimize(
            parse(&rendered).unwrap().ast,
            crate::optimizer::OptimizerFlags::ALL,
        );
        assert_eq!(first, second, "{:?} rendered as {:?}", source, rendered);
    }

    #[test]
    fn round_trip_literal() {
        round_trips("cat");
    }

    #[test]
    fn round_trip_union_and_class() {
        round_trips("[AB]|cd|\\d+");
    }

    #[test]
    fn round_trip_backreference_and_lookahead() {
        round_trips("(A(?=B)).\\1");
    }

    #[test]
    fn round_trip_counted_repetition() {
        round_trips("a{2,5}(bc){3}");
    }
}
