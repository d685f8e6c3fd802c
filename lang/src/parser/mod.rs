pub mod ast;


use crate::error::MiniRubyError;
use crate::lexer::token::{Span, Token, TokenKind};
use crate::lexer::Lexer;
use ast::{Node, NodeKind};

/// Result of parsing: always a tree, plus whatever went wrong along the way.
/// Lexer failures surface here too, forwarded from in-band `ERROR` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProgram {
    pub program: Node,
    pub errors: Vec<MiniRubyError>,
}

pub fn parse(source: &str) -> ParsedProgram {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    ParsedProgram {
        program,
        errors: parser.errors,
    }
}

// Binding powers, loosest first. Assignment is right-associative; everything
// else associates left.
const PREC_NONE: u8 = 0;
const PREC_ASSIGNMENT: u8 = 1;
const PREC_EQUALITY: u8 = 2;
const PREC_COMPARISON: u8 = 3;
const PREC_ADDITIVE: u8 = 4;
const PREC_MULTIPLICATIVE: u8 = 5;

fn infix_precedence(kind: &TokenKind) -> u8 {
    match kind {
        TokenKind::Equal => PREC_ASSIGNMENT,
        TokenKind::EqualEqual | TokenKind::NotEqual => PREC_EQUALITY,
        TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual => PREC_COMPARISON,
        TokenKind::Plus | TokenKind::Minus => PREC_ADDITIVE,
        TokenKind::Star | TokenKind::Slash => PREC_MULTIPLICATIVE,
        _ => PREC_NONE,
    }
}

/// Recursive-descent parser with Pratt-style expression layering. Errors are
/// accumulated, never thrown: recovery substitutes `Invalid` nodes and keeps
/// going so one run reports as much as possible.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Tracks `(` nesting; newlines are insignificant inside parentheses.
    paren_depth: usize,
    errors: Vec<MiniRubyError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: Token::none(),
            paren_depth: 0,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    pub fn parse_program(&mut self) -> Node {
        let mut statements = Vec::new();

        self.skip_separators();
        while self.current.kind != TokenKind::Eof {
            statements.push(self.parse_statement());
            self.skip_separators();
        }

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => Span::join(first.span, last.span),
            _ => Span::ZERO,
        };
        Node::new(NodeKind::Program { statements }, span)
    }

    /// `statement = expression (NEWLINE | SEMICOLON | EOF)`. A trailing
    /// separator extends the statement's span. `end`/`else` terminate a
    /// statement without being consumed, like `EOF`, so block bodies can
    /// share this production.
    fn parse_statement(&mut self) -> Node {
        let expression = self.parse_expression();
        let mut span = expression.span;

        match &self.current.kind {
            TokenKind::Newline | TokenKind::Semicolon => {
                span = Span::join(span, self.current.span);
                self.advance();
            }
            TokenKind::Eof | TokenKind::End | TokenKind::Else => {}
            // The lexer already flagged this token; its message is recorded
            // when the token is consumed as the start of the next statement.
            TokenKind::Error(_) => {}
            kind => {
                let message = format!("unexpected {kind}, expected a statement separator");
                self.error(message, self.current.span);
            }
        }

        Node::new(
            NodeKind::ExpressionStatement {
                expression: Box::new(expression),
            },
            span,
        )
    }

    fn parse_expression(&mut self) -> Node {
        self.parse_precedence(PREC_ASSIGNMENT)
    }

    fn parse_precedence(&mut self, min_precedence: u8) -> Node {
        let mut left = self.parse_unary();

        loop {
            let precedence = infix_precedence(&self.current.kind);
            if precedence == PREC_NONE || precedence < min_precedence {
                break;
            }
            left = self.parse_infix(left, precedence);
        }

        left
    }

    fn parse_infix(&mut self, left: Node, precedence: u8) -> Node {
        let operator = self.current.clone();
        self.advance();
        // Newlines do not terminate an expression mid-operator.
        self.skip_newlines();

        if operator.kind == TokenKind::Equal {
            if !matches!(left.kind, NodeKind::Identifier { .. }) {
                self.error(
                    "unexpected EQUAL, expected an identifier".to_string(),
                    operator.span,
                );
            }
            // Same binding power on the right makes assignment right-assoc.
            let value = self.parse_precedence(precedence);
            let span = Span::join(left.span, value.span);
            return Node::new(
                NodeKind::Assignment {
                    target: Box::new(left),
                    value: Box::new(value),
                },
                span,
            );
        }

        let right = self.parse_precedence(precedence + 1);
        let span = Span::join(left.span, right.span);
        Node::new(
            NodeKind::Binary {
                operator: operator.kind,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_unary(&mut self) -> Node {
        match self.current.kind {
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus => {
                let operator = self.current.clone();
                self.advance();
                let operand = self.parse_unary();
                let span = Span::join(operator.span, operand.span);
                Node::new(
                    NodeKind::Unary {
                        operator: operator.kind,
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_call_arguments(&mut self, name: String, name_span: Span) -> Node {
        self.paren_depth += 1;
        self.advance(); // (

        let mut arguments = Vec::new();
        if self.current.kind != TokenKind::RightParen {
            loop {
                arguments.push(self.parse_expression());
                if self.current.kind != TokenKind::Comma {
                    break;
                }
                self.advance(); // ,
                if self.current.kind == TokenKind::RightParen {
                    break; // trailing comma
                }
            }
        }

        let mut span = match arguments.last() {
            Some(last) => Span::join(name_span, last.span),
            None => name_span,
        };

        self.paren_depth -= 1;
        if self.current.kind == TokenKind::RightParen {
            span = Span::join(span, self.current.span);
            self.advance();
        } else {
            let message = format!("unexpected {}, expected RPAREN", self.current.kind);
            self.error(message, self.current.span);
            if self.current.kind != TokenKind::Eof {
                self.advance();
            }
        }

        Node::new(NodeKind::FunctionCall { name, arguments }, span)
    }

    fn parse_primary(&mut self) -> Node {
        let token = self.current.clone();

        match &token.kind {
            TokenKind::Integer(digits) => {
                self.advance();
                Node::new(
                    NodeKind::IntegerLiteral {
                        digits: digits.clone(),
                    },
                    token.span,
                )
            }
            TokenKind::Float(digits) => {
                self.advance();
                Node::new(
                    NodeKind::FloatLiteral {
                        digits: digits.clone(),
                    },
                    token.span,
                )
            }
            TokenKind::String(value) => {
                self.advance();
                Node::new(
                    NodeKind::StringLiteral {
                        value: value.clone(),
                    },
                    token.span,
                )
            }
            TokenKind::True => self.literal(NodeKind::TrueLiteral),
            TokenKind::False => self.literal(NodeKind::FalseLiteral),
            TokenKind::Nil => self.literal(NodeKind::NilLiteral),
            TokenKind::SelfKw => self.literal(NodeKind::SelfLiteral),
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                // `call = primary ["(" [arg_list] ")"]`, on identifier
                // primaries only; a parenthesized expression is never a
                // callee.
                if self.current.kind == TokenKind::LeftParen {
                    return self.parse_call_arguments(name, token.span);
                }
                Node::new(NodeKind::Identifier { name }, token.span)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::LeftParen => self.parse_grouping(),
            TokenKind::Error(message) => {
                // Forward the lexer's diagnostic; adding an "expected" error
                // on top would just duplicate it.
                let span = token.span;
                self.errors.push(MiniRubyError::lex(message.clone(), span));
                self.advance();
                Node::new(NodeKind::Invalid { token }, span)
            }
            TokenKind::Eof => {
                let span = token.span;
                self.error(
                    "unexpected END_OF_FILE, expected an expression".to_string(),
                    span,
                );
                Node::new(NodeKind::Invalid { token }, span)
            }
            kind => {
                let span = token.span;
                let message = format!("unexpected {kind}, expected an expression");
                self.error(message, span);
                self.advance();
                Node::new(NodeKind::Invalid { token }, span)
            }
        }
    }

    fn literal(&mut self, kind: NodeKind) -> Node {
        let span = self.current.span;
        self.advance();
        Node::new(kind, span)
    }

    /// `return [expression]` — the value is present iff the lookahead can
    /// begin an expression.
    fn parse_return(&mut self) -> Node {
        let keyword_span = self.current.span;
        self.advance();

        let starts_expression = !matches!(
            self.current.kind,
            TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Eof
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::RightParen
                | TokenKind::Comma
        );

        if starts_expression {
            let value = self.parse_expression();
            let span = Span::join(keyword_span, value.span);
            Node::new(
                NodeKind::Return {
                    value: Some(Box::new(value)),
                },
                span,
            )
        } else {
            Node::new(NodeKind::Return { value: None }, keyword_span)
        }
    }

    fn parse_if(&mut self) -> Node {
        let keyword_span = self.current.span;
        self.advance();

        let condition = self.parse_expression();
        self.expect_block_separator();

        let then_body = self.parse_block_statements(&[TokenKind::Else, TokenKind::End]);

        let else_body = if self.current.kind == TokenKind::Else {
            self.advance();
            if matches!(self.current.kind, TokenKind::Newline | TokenKind::Semicolon) {
                self.skip_separators();
                Some(self.parse_block_statements(&[TokenKind::End]))
            } else {
                // Inline form: `else <expression>`.
                Some(vec![self.parse_statement()])
            }
        } else {
            None
        };

        let end = self.expect_end(keyword_span);
        Node::new(
            NodeKind::If {
                condition: Box::new(condition),
                then_body,
                else_body,
            },
            Span::join(keyword_span, end),
        )
    }

    fn parse_while(&mut self) -> Node {
        let keyword_span = self.current.span;
        self.advance();

        let condition = self.parse_expression();
        self.expect_block_separator();

        let body = self.parse_block_statements(&[TokenKind::End]);

        let end = self.expect_end(keyword_span);
        Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body,
            },
            Span::join(keyword_span, end),
        )
    }

    fn parse_grouping(&mut self) -> Node {
        let open_span = self.current.span;
        self.paren_depth += 1;
        self.advance(); // (

        let mut expression = self.parse_expression();

        self.paren_depth -= 1;
        if self.current.kind == TokenKind::RightParen {
            expression.span = Span::join(open_span, self.current.span);
            self.advance();
        } else {
            let message = format!("unexpected {}, expected RPAREN", self.current.kind);
            self.error(message, self.current.span);
            expression.span = Span::join(open_span, expression.span);
            if self.current.kind != TokenKind::Eof {
                self.advance();
            }
        }

        expression
    }

    fn parse_block_statements(&mut self, stop: &[TokenKind]) -> Vec<Node> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            if self.current.kind == TokenKind::Eof || stop.contains(&self.current.kind) {
                break;
            }
            statements.push(self.parse_statement());
        }

        statements
    }

    /// The separator a block header requires before its body.
    fn expect_block_separator(&mut self) {
        if matches!(self.current.kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.skip_separators();
        } else {
            let message = format!(
                "unexpected {}, expected a statement separator",
                self.current.kind
            );
            self.error(message, self.current.span);
        }
    }

    /// Consume the closing `end` of a block, recovering if it is missing.
    /// Returns the span the enclosing node should extend to.
    fn expect_end(&mut self, fallback: Span) -> Span {
        if self.current.kind == TokenKind::End {
            let span = self.current.span;
            self.advance();
            span
        } else {
            let message = format!("unexpected {}, expected END", self.current.kind);
            self.error(message, self.current.span);
            if self.current.kind != TokenKind::Eof {
                self.advance();
            }
            fallback
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.current.kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.current.kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
        // Inside parentheses newlines carry no meaning at all.
        while self.paren_depth > 0 && self.current.kind == TokenKind::Newline {
            self.current = self.lexer.next_token();
        }
    }

    fn error(&mut self, message: String, span: Span) {
        self.errors.push(MiniRubyError::parse(message, span));
    }
}
