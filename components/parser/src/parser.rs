//! Recursive descent parser for JavaScript
//!
//! The parser owns a [`ParserPlugin`] and calls its hooks at fixed points:
//! around class bodies and class methods, for private member names, after
//! every unary expression and after every primary expression.

use crate::ast::*;
use crate::error::*;
use crate::lexer::{Keyword, Lexer, Punctuator, Token};
use crate::options::{reserved_word_message, ParserOptions, SourceType};
use crate::plugin::{NoPlugin, ParserPlugin, PrivateMemberKind};
use crate::private_names::PrivateNames;
use core_types::{JsError, SourcePosition, Span};
use tracing::debug;

/// Parse `source` as a script with private class elements enabled
pub fn parse_with_private_names(source: &str) -> Result<Program, JsError> {
    Parser::with_plugin(source, ParserOptions::default(), PrivateNames::new()).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// JavaScript parser
pub struct Parser<P: ParserPlugin = NoPlugin> {
    lexer: Lexer,
    options: ParserOptions,
    plugin: P,
    /// Track if we're in strict mode
    strict_mode: bool,
    /// Track loop depth for break/continue validation
    loop_depth: usize,
    /// Track switch depth for break validation
    switch_depth: usize,
    /// Track function depth for return validation
    function_depth: usize,
    /// Track if we're inside a generator function (for yield expressions)
    in_generator: bool,
    /// Track if we're inside an async function (for await expressions)
    in_async: bool,
    /// Inside a method, field initializer or static block (allows super)
    in_method: bool,
    /// Track if we're in for loop init (disallows 'in' as relational operator)
    in_for_init: bool,
}

impl Parser<NoPlugin> {
    /// Create a new parser for the given source code
    pub fn new(source: &str) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    /// Create a parser with explicit options
    pub fn with_options(source: &str, options: ParserOptions) -> Self {
        Parser::with_plugin(source, options, NoPlugin)
    }
}

impl<P: ParserPlugin> Parser<P> {
    /// Create a parser extended by `plugin`
    pub fn with_plugin(source: &str, options: ParserOptions, plugin: P) -> Self {
        let lexer = Lexer::with_rules(source, plugin.token_rules());
        Self {
            lexer,
            strict_mode: options.source_type == SourceType::Module,
            options,
            plugin,
            loop_depth: 0,
            switch_depth: 0,
            function_depth: 0,
            in_generator: false,
            in_async: false,
            in_method: false,
            in_for_init: false,
        }
    }

    /// The installed plugin
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Consume the parser, returning its plugin
    pub fn into_plugin(self) -> P {
        self.plugin
    }

    /// Parse the source into an AST
    pub fn parse(&mut self) -> Result<Program, JsError> {
        self.plugin.reset();
        let body = self.parse_statement_list(false)?;
        let end = self.lexer.peek_start()?;
        debug!(statements = body.len(), strict = self.strict_mode, "parsed program");
        Ok(Program {
            body,
            span: Span::new(SourcePosition::start_of_source(), end),
        })
    }

    /// Statements up to `}` (not consumed) or end of input, honoring a
    /// leading "use strict" directive
    fn parse_statement_list(&mut self, until_brace: bool) -> Result<Vec<Statement>, JsError> {
        let mut body = Vec::new();
        let mut in_prologue = true;
        loop {
            let done = if until_brace {
                self.check_punctuator(Punctuator::RBrace)?
            } else {
                self.is_at_end()?
            };
            if done {
                break;
            }

            let statement = self.parse_statement()?;
            if in_prologue {
                match &statement {
                    Statement::ExpressionStatement {
                        expression:
                            Expression::Literal {
                                value: Literal::String(directive),
                                ..
                            },
                        ..
                    } => {
                        if directive == "use strict" {
                            self.strict_mode = true;
                        }
                    }
                    _ => in_prologue = false,
                }
            }
            body.push(statement);
        }
        Ok(body)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_position()?;
        let token = self.lexer.peek_token()?.clone();

        match token {
            Token::Punctuator(Punctuator::LBrace) => {
                let body = self.parse_block_body()?;
                Ok(Statement::BlockStatement {
                    body,
                    span: self.finish_span(start),
                })
            }
            Token::Punctuator(Punctuator::Semicolon) => {
                self.lexer.next_token()?;
                Ok(Statement::EmptyStatement {
                    span: self.finish_span(start),
                })
            }
            Token::Keyword(Keyword::Var) => self.parse_variable_statement(start, VariableKind::Var),
            Token::Keyword(Keyword::Const) => {
                self.parse_variable_statement(start, VariableKind::Const)
            }
            Token::Keyword(Keyword::Let) if self.is_let_declaration()? => {
                self.parse_variable_statement(start, VariableKind::Let)
            }
            Token::Keyword(Keyword::Function) => self.parse_function_declaration(start, false),
            Token::Keyword(Keyword::Async) if self.is_async_function()? => {
                self.lexer.next_token()?;
                self.parse_function_declaration(start, true)
            }
            Token::Keyword(Keyword::Class) => self.parse_class_declaration(start),
            Token::Keyword(Keyword::Return) => self.parse_return_statement(start),
            Token::Keyword(Keyword::If) => self.parse_if_statement(start),
            Token::Keyword(Keyword::While) => self.parse_while_statement(start),
            Token::Keyword(Keyword::Do) => self.parse_do_while_statement(start),
            Token::Keyword(Keyword::For) => self.parse_for_statement(start),
            Token::Keyword(Keyword::Break) => self.parse_break_continue(start, true),
            Token::Keyword(Keyword::Continue) => self.parse_break_continue(start, false),
            Token::Keyword(Keyword::Throw) => self.parse_throw_statement(start),
            Token::Keyword(Keyword::Try) => self.parse_try_statement(start),
            Token::Keyword(Keyword::Switch) => self.parse_switch_statement(start),
            Token::Keyword(Keyword::Debugger) => {
                self.lexer.next_token()?;
                self.consume_semicolon()?;
                Ok(Statement::DebuggerStatement {
                    span: self.finish_span(start),
                })
            }
            Token::Keyword(Keyword::Import | Keyword::Export | Keyword::With) => self.unexpected(),
            _ => self.parse_expression_statement(start),
        }
    }

    /// `let` starts a declaration when a binding follows it
    fn is_let_declaration(&mut self) -> Result<bool, JsError> {
        let (next, _) = self.peek_second()?;
        Ok(matches!(
            next,
            Token::Identifier(..)
                | Token::Punctuator(Punctuator::LBracket)
                | Token::Punctuator(Punctuator::LBrace)
        ) || matches!(next, Token::Keyword(k) if k.is_contextual()))
    }

    fn is_async_function(&mut self) -> Result<bool, JsError> {
        let (next, newline) = self.peek_second()?;
        Ok(!newline && next == Token::Keyword(Keyword::Function))
    }

    fn parse_block_body(&mut self) -> Result<Vec<Statement>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        while !self.check_punctuator(Punctuator::RBrace)? {
            body.push(self.parse_statement()?);
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(body)
    }

    fn parse_variable_statement(
        &mut self,
        start: SourcePosition,
        kind: VariableKind,
    ) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let declarations = self.parse_variable_declarators(kind, false)?;
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration {
            kind,
            declarations,
            span: self.finish_span(start),
        })
    }

    fn parse_variable_declarators(
        &mut self,
        kind: VariableKind,
        in_for_head: bool,
    ) -> Result<Vec<VariableDeclarator>, JsError> {
        let mut declarations = Vec::new();
        loop {
            let id = self.parse_binding_target()?;
            let init = if self.eat_punctuator(Punctuator::Assign)? {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            let needs_init =
                kind == VariableKind::Const || !matches!(id, Pattern::Identifier { .. });
            if init.is_none() && needs_init && !in_for_head {
                return self.unexpected();
            }
            declarations.push(VariableDeclarator { id, init });
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        Ok(declarations)
    }

    fn parse_function_declaration(
        &mut self,
        start: SourcePosition,
        is_async: bool,
    ) -> Result<Statement, JsError> {
        self.expect_keyword(Keyword::Function)?;
        let is_generator = self.eat_punctuator(Punctuator::Star)?;
        let (name, _) = self.parse_binding_identifier()?;
        let (params, body) = self.parse_function_rest(is_async, is_generator, false)?;
        Ok(Statement::FunctionDeclaration {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.finish_span(start),
        })
    }

    fn parse_class_declaration(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        let (name, super_class, body) = self.parse_class(true)?;
        let Some(name) = name else {
            return self.unexpected_at(start);
        };
        Ok(Statement::ClassDeclaration {
            name,
            super_class,
            body,
            span: self.finish_span(start),
        })
    }

    fn parse_return_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        if self.function_depth == 0 {
            return Err(syntax_error("'return' outside of function", Some(start)));
        }
        self.lexer.next_token()?;
        let argument = if self.at_statement_end()? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::ReturnStatement {
            argument,
            span: self.finish_span(start),
        })
    }

    fn parse_if_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::IfStatement {
            test,
            consequent,
            alternate,
            span: self.finish_span(start),
        })
    }

    fn parse_while_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let test = self.parse_paren_expression()?;
        let body = Box::new(self.parse_loop_body()?);
        Ok(Statement::WhileStatement {
            test,
            body,
            span: self.finish_span(start),
        })
    }

    fn parse_do_while_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let body = Box::new(self.parse_loop_body()?);
        self.expect_keyword(Keyword::While)?;
        let test = self.parse_paren_expression()?;
        // A semicolon is always inserted after the closing paren
        self.eat_punctuator(Punctuator::Semicolon)?;
        Ok(Statement::DoWhileStatement {
            body,
            test,
            span: self.finish_span(start),
        })
    }

    fn parse_loop_body(&mut self) -> Result<Statement, JsError> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        body
    }

    fn parse_for_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        self.expect_punctuator(Punctuator::LParen)?;

        let kind = match self.lexer.peek_token()? {
            Token::Keyword(Keyword::Var) => Some(VariableKind::Var),
            Token::Keyword(Keyword::Const) => Some(VariableKind::Const),
            Token::Keyword(Keyword::Let) => Some(VariableKind::Let),
            _ => None,
        };
        let kind = match kind {
            Some(VariableKind::Let) if !self.is_let_declaration()? => None,
            other => other,
        };

        let init = if self.check_punctuator(Punctuator::Semicolon)? {
            None
        } else if let Some(kind) = kind {
            self.lexer.next_token()?;
            let prev_for_init = self.in_for_init;
            self.in_for_init = true;
            let declarations = self.parse_variable_declarators(kind, true);
            self.in_for_init = prev_for_init;
            let mut declarations = declarations?;

            if declarations.len() == 1 && declarations[0].init.is_none() && self.at_for_in_of()? {
                let Some(declarator) = declarations.pop() else {
                    return self.unexpected();
                };
                let left = ForInOfLeft::VariableDeclaration {
                    kind,
                    id: declarator.id,
                };
                return self.parse_for_in_of(start, left);
            }
            Some(ForInit::VariableDeclaration { kind, declarations })
        } else {
            let prev_for_init = self.in_for_init;
            self.in_for_init = true;
            let expression = self.parse_expression();
            self.in_for_init = prev_for_init;
            let expression = expression?;

            if self.at_for_in_of()? {
                let left = match expression {
                    Expression::ArrayExpression { .. } | Expression::ObjectExpression { .. } => {
                        ForInOfLeft::Pattern(self.expression_to_pattern(expression, true)?)
                    }
                    expression => {
                        self.check_simple_target(&expression)?;
                        ForInOfLeft::Expression(expression)
                    }
                };
                return self.parse_for_in_of(start, left);
            }
            Some(ForInit::Expression(expression))
        };

        self.expect_punctuator(Punctuator::Semicolon)?;
        let test = if self.check_punctuator(Punctuator::Semicolon)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::Semicolon)?;
        let update = if self.check_punctuator(Punctuator::RParen)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::RParen)?;
        let body = Box::new(self.parse_loop_body()?);

        Ok(Statement::ForStatement {
            init,
            test,
            update,
            body,
            span: self.finish_span(start),
        })
    }

    fn at_for_in_of(&mut self) -> Result<bool, JsError> {
        Ok(self.check_keyword(Keyword::In)? || self.check_identifier("of")?)
    }

    fn parse_for_in_of(
        &mut self,
        start: SourcePosition,
        left: ForInOfLeft,
    ) -> Result<Statement, JsError> {
        let is_of = self.check_identifier("of")?;
        self.lexer.next_token()?;
        let right = if is_of {
            self.parse_assignment_expression()?
        } else {
            self.parse_expression()?
        };
        self.expect_punctuator(Punctuator::RParen)?;
        let body = Box::new(self.parse_loop_body()?);
        let span = self.finish_span(start);
        Ok(if is_of {
            Statement::ForOfStatement {
                left,
                right,
                body,
                span,
            }
        } else {
            Statement::ForInStatement {
                left,
                right,
                body,
                span,
            }
        })
    }

    fn parse_break_continue(
        &mut self,
        start: SourcePosition,
        is_break: bool,
    ) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let label = if !self.lexer.has_newline_before()? && self.at_identifier()? {
            Some(self.parse_identifier_reference()?.0)
        } else {
            None
        };

        let in_target = self.loop_depth > 0 || (is_break && self.switch_depth > 0);
        if label.is_none() && !in_target {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(syntax_error(format!("Unsyntactic {}", keyword), Some(start)));
        }
        self.consume_semicolon()?;

        let span = self.finish_span(start);
        Ok(if is_break {
            Statement::BreakStatement { label, span }
        } else {
            Statement::ContinueStatement { label, span }
        })
    }

    fn parse_throw_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        if self.lexer.has_newline_before()? {
            return Err(syntax_error(
                "Illegal newline after throw",
                Some(self.lexer.last_token_end()),
            ));
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::ThrowStatement {
            argument,
            span: self.finish_span(start),
        })
    }

    fn parse_try_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let block = self.parse_block_body()?;

        let handler = if self.eat_keyword(Keyword::Catch)? {
            let param = if self.eat_punctuator(Punctuator::LParen)? {
                let param = self.parse_binding_target()?;
                self.expect_punctuator(Punctuator::RParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block_body()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat_keyword(Keyword::Finally)? {
            Some(self.parse_block_body()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(syntax_error("Missing catch or finally clause", Some(start)));
        }

        Ok(Statement::TryStatement {
            block,
            handler,
            finalizer,
            span: self.finish_span(start),
        })
    }

    fn parse_switch_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        self.lexer.next_token()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect_punctuator(Punctuator::LBrace)?;

        self.switch_depth += 1;
        let cases = self.parse_switch_cases();
        self.switch_depth -= 1;
        let cases = cases?;

        Ok(Statement::SwitchStatement {
            discriminant,
            cases,
            span: self.finish_span(start),
        })
    }

    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>, JsError> {
        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.eat_punctuator(Punctuator::RBrace)? {
            let case_start = self.start_position()?;
            let test = if self.eat_keyword(Keyword::Case)? {
                Some(self.parse_expression()?)
            } else if self.eat_keyword(Keyword::Default)? {
                if has_default {
                    return Err(syntax_error("Multiple default clauses", Some(case_start)));
                }
                has_default = true;
                None
            } else {
                return self.unexpected();
            };
            self.expect_punctuator(Punctuator::Colon)?;

            let mut consequent = Vec::new();
            while !self.check_punctuator(Punctuator::RBrace)?
                && !self.check_keyword(Keyword::Case)?
                && !self.check_keyword(Keyword::Default)?
            {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, consequent });
        }
        Ok(cases)
    }

    fn parse_expression_statement(&mut self, start: SourcePosition) -> Result<Statement, JsError> {
        let expression = self.parse_expression()?;

        if let Expression::Identifier { name, .. } = &expression {
            if self.eat_punctuator(Punctuator::Colon)? {
                let label = name.clone();
                let body = Box::new(self.parse_statement()?);
                return Ok(Statement::LabeledStatement {
                    label,
                    body,
                    span: self.finish_span(start),
                });
            }
        }

        self.consume_semicolon()?;
        Ok(Statement::ExpressionStatement {
            expression,
            span: self.finish_span(start),
        })
    }

    // ------------------------------------------------------------------
    // Functions and classes
    // ------------------------------------------------------------------

    /// Parameters and body of a function; methods may use `super`
    fn parse_function_rest(
        &mut self,
        is_async: bool,
        is_generator: bool,
        is_method: bool,
    ) -> Result<(Vec<Pattern>, Vec<Statement>), JsError> {
        let prev_async = self.in_async;
        let prev_generator = self.in_generator;
        let prev_method = self.in_method;
        let prev_loop_depth = self.loop_depth;
        let prev_switch_depth = self.switch_depth;
        let prev_for_init = self.in_for_init;
        let prev_strict = self.strict_mode;

        self.in_async = is_async;
        self.in_generator = is_generator;
        self.in_method = is_method;
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.in_for_init = false;
        self.function_depth += 1;

        let result = self
            .parse_formal_parameters()
            .and_then(|params| Ok((params, self.parse_function_body()?)));

        self.function_depth -= 1;
        self.in_async = prev_async;
        self.in_generator = prev_generator;
        self.in_method = prev_method;
        self.loop_depth = prev_loop_depth;
        self.switch_depth = prev_switch_depth;
        self.in_for_init = prev_for_init;
        self.strict_mode = prev_strict;

        result
    }

    fn parse_formal_parameters(&mut self) -> Result<Vec<Pattern>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let mut params = Vec::new();
        while !self.eat_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                params.push(self.parse_rest_element()?);
                self.expect_punctuator(Punctuator::RParen)?;
                break;
            }
            params.push(self.parse_binding_element()?);
            if !self.eat_punctuator(Punctuator::Comma)? {
                self.expect_punctuator(Punctuator::RParen)?;
                break;
            }
        }
        Ok(params)
    }

    fn parse_function_body(&mut self) -> Result<Vec<Statement>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let body = self.parse_statement_list(true)?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(body)
    }

    fn parse_function_expression(
        &mut self,
        start: SourcePosition,
        is_async: bool,
    ) -> Result<Expression, JsError> {
        self.expect_keyword(Keyword::Function)?;
        let is_generator = self.eat_punctuator(Punctuator::Star)?;
        let name = if self.at_identifier()? {
            Some(self.parse_binding_identifier()?.0)
        } else {
            None
        };
        let (params, body) = self.parse_function_rest(is_async, is_generator, false)?;
        Ok(Expression::FunctionExpression {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.finish_span(start),
        })
    }

    /// Function value of a method, spanning from its parameter list
    fn parse_method_value(
        &mut self,
        is_async: bool,
        is_generator: bool,
    ) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let (params, body) = self.parse_function_rest(is_async, is_generator, true)?;
        Ok(Expression::FunctionExpression {
            name: None,
            params,
            body,
            is_async,
            is_generator,
            span: self.finish_span(start),
        })
    }

    /// `class [name] [extends expr] { ... }`; class code is always strict
    fn parse_class(
        &mut self,
        is_statement: bool,
    ) -> Result<(Option<String>, Option<Box<Expression>>, ClassBody), JsError> {
        self.expect_keyword(Keyword::Class)?;
        let prev_strict = self.strict_mode;
        self.strict_mode = true;
        let result = self.parse_class_rest(is_statement);
        self.strict_mode = prev_strict;
        result
    }

    fn parse_class_rest(
        &mut self,
        is_statement: bool,
    ) -> Result<(Option<String>, Option<Box<Expression>>, ClassBody), JsError> {
        let name = if self.at_identifier()? {
            Some(self.parse_binding_identifier()?.0)
        } else if is_statement {
            return self.unexpected();
        } else {
            None
        };

        let super_class = if self.eat_keyword(Keyword::Extends)? {
            Some(Box::new(self.parse_left_hand_side_expression()?))
        } else {
            None
        };

        let body = self.parse_class_body()?;
        Ok((name, super_class, body))
    }

    fn parse_class_body(&mut self) -> Result<ClassBody, JsError> {
        let start = self.start_position()?;
        self.expect_punctuator(Punctuator::LBrace)?;

        self.plugin.enter_class();
        let elements = self.parse_class_elements();
        let exited = self.plugin.exit_class();
        let elements = elements?;
        exited?;

        Ok(ClassBody {
            body: elements,
            span: self.finish_span(start),
        })
    }

    /// Class elements through the closing `}`
    fn parse_class_elements(&mut self) -> Result<Vec<ClassElement>, JsError> {
        let mut elements = Vec::new();
        let mut has_constructor = false;
        loop {
            if self.eat_punctuator(Punctuator::Semicolon)? {
                continue;
            }
            if self.eat_punctuator(Punctuator::RBrace)? {
                break;
            }

            let element = self.parse_class_element()?;
            if let ClassElement::MethodDefinition {
                kind: MethodKind::Constructor,
                span,
                ..
            } = &element
            {
                if has_constructor {
                    return Err(syntax_error(
                        "Duplicate constructor in the same class",
                        Some(span.start.clone()),
                    ));
                }
                has_constructor = true;
            }
            elements.push(element);
        }
        Ok(elements)
    }

    fn parse_class_element(&mut self) -> Result<ClassElement, JsError> {
        let start = self.start_position()?;

        let mut is_static = false;
        if self.check_keyword(Keyword::Static)? {
            let (next, _) = self.peek_second()?;
            if next == Token::Punctuator(Punctuator::LBrace) {
                self.lexer.next_token()?;
                return self.parse_static_block(start);
            }
            if !ends_property_name(&next) {
                self.lexer.next_token()?;
                is_static = true;
            }
        }

        let mut is_async = false;
        if self.check_keyword(Keyword::Async)? {
            let (next, newline) = self.peek_second()?;
            if !newline && !ends_property_name(&next) {
                self.lexer.next_token()?;
                is_async = true;
            }
        }

        let is_generator = self.eat_punctuator(Punctuator::Star)?;
        let mut kind = MethodKind::Method;
        if !is_async && !is_generator {
            if let Some(accessor) = self.accessor_kind()? {
                kind = accessor;
            }
        }

        let (key, computed) = if matches!(self.lexer.peek_token()?, Token::PrivateName(_)) {
            (PropertyKey::PrivateName(self.parse_private_name()?), false)
        } else {
            self.parse_property_key()?
        };
        let is_method = self.check_punctuator(Punctuator::LParen)?;
        if !is_method && (kind != MethodKind::Method || is_async || is_generator) {
            return self.unexpected();
        }

        if let PropertyKey::PrivateName(name) = &key {
            let private_kind = match (is_method, kind) {
                (true, MethodKind::Get) => PrivateMemberKind::Get,
                (true, MethodKind::Set) => PrivateMemberKind::Set,
                (true, _) => PrivateMemberKind::Method,
                (false, _) => PrivateMemberKind::Field,
            };
            let accepted = self.plugin.declare_private_member(
                name,
                private_kind,
                &start,
                &self.options,
            )?;
            if !accepted {
                return Err(unexpected_token(Some(name.span.start.clone())));
            }
        }

        if is_method {
            self.parse_class_method(start, key, kind, is_static, computed, is_async, is_generator)
        } else {
            self.parse_class_field(start, key, is_static, computed)
        }
    }

    /// `get`/`set` written as a modifier rather than as the element name
    fn accessor_kind(&mut self) -> Result<Option<MethodKind>, JsError> {
        let kind = match self.lexer.peek_token()? {
            Token::Identifier(word, false) if word == "get" => MethodKind::Get,
            Token::Identifier(word, false) if word == "set" => MethodKind::Set,
            _ => return Ok(None),
        };
        let (next, _) = self.peek_second()?;
        if ends_property_name(&next) {
            return Ok(None);
        }
        self.lexer.next_token()?;
        Ok(Some(kind))
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_class_method(
        &mut self,
        start: SourcePosition,
        key: PropertyKey,
        kind: MethodKind,
        is_static: bool,
        computed: bool,
        is_async: bool,
        is_generator: bool,
    ) -> Result<ClassElement, JsError> {
        let is_constructor =
            !is_static && !computed && key.static_name() == Some("constructor");
        let kind = if is_constructor {
            if kind != MethodKind::Method {
                return Err(syntax_error(
                    "Constructor can't have get/set modifier",
                    Some(key.span().start.clone()),
                ));
            }
            if is_generator {
                return Err(syntax_error(
                    "Constructor can't be a generator",
                    Some(key.span().start.clone()),
                ));
            }
            if is_async {
                return Err(syntax_error(
                    "Constructor can't be an async method",
                    Some(key.span().start.clone()),
                ));
            }
            MethodKind::Constructor
        } else {
            kind
        };
        if is_static && !computed && key.static_name() == Some("prototype") {
            return Err(syntax_error(
                "Classes may not have a static property named prototype",
                Some(key.span().start.clone()),
            ));
        }

        let saved = self.plugin.enter_method(&key);
        let value = self.parse_method_value(is_async, is_generator);
        self.plugin.exit_method(saved);
        let value = value?;

        if let Expression::FunctionExpression { params, span, .. } = &value {
            match kind {
                MethodKind::Get if !params.is_empty() => {
                    return Err(syntax_error(
                        "getter should have no params",
                        Some(span.start.clone()),
                    ));
                }
                MethodKind::Set
                    if params.len() != 1
                        || matches!(params[0], Pattern::RestElement { .. }) =>
                {
                    return Err(syntax_error(
                        "setter should have exactly one param",
                        Some(span.start.clone()),
                    ));
                }
                _ => {}
            }
        }

        Ok(ClassElement::MethodDefinition {
            key,
            kind,
            value,
            is_static,
            computed,
            span: self.finish_span(start),
        })
    }

    fn parse_class_field(
        &mut self,
        start: SourcePosition,
        key: PropertyKey,
        is_static: bool,
        computed: bool,
    ) -> Result<ClassElement, JsError> {
        if !computed && key.static_name() == Some("constructor") {
            return Err(syntax_error(
                "Classes can't have a field named 'constructor'",
                Some(key.span().start.clone()),
            ));
        }

        let value = if self.eat_punctuator(Punctuator::Assign)? {
            let prev_method = self.in_method;
            let prev_async = self.in_async;
            let prev_generator = self.in_generator;
            self.in_method = true;
            self.in_async = false;
            self.in_generator = false;
            let value = self.allow_in(|parser| parser.parse_assignment_expression());
            self.in_method = prev_method;
            self.in_async = prev_async;
            self.in_generator = prev_generator;
            Some(value?)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(ClassElement::PropertyDefinition {
            key,
            value,
            is_static,
            computed,
            span: self.finish_span(start),
        })
    }

    fn parse_static_block(&mut self, start: SourcePosition) -> Result<ClassElement, JsError> {
        let prev_method = self.in_method;
        let prev_function_depth = self.function_depth;
        let prev_loop_depth = self.loop_depth;
        let prev_switch_depth = self.switch_depth;
        let prev_async = self.in_async;
        let prev_generator = self.in_generator;
        self.in_method = true;
        self.function_depth = 0;
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.in_async = false;
        self.in_generator = false;

        let body = self.parse_block_body();

        self.in_method = prev_method;
        self.function_depth = prev_function_depth;
        self.loop_depth = prev_loop_depth;
        self.switch_depth = prev_switch_depth;
        self.in_async = prev_async;
        self.in_generator = prev_generator;

        Ok(ClassElement::StaticBlock {
            body: body?,
            span: self.finish_span(start),
        })
    }

    /// `#name`; an empty name is reported at the token after the `#`
    fn parse_private_name(&mut self) -> Result<PrivateName, JsError> {
        let start = self.start_position()?;
        let Token::PrivateName(name) = self.lexer.next_token()? else {
            return self.unexpected_at(start);
        };
        if name.is_empty() {
            return self.unexpected();
        }
        Ok(PrivateName {
            name,
            span: self.finish_span(start),
        })
    }

    /// Identifier, keyword, string, number or computed key.
    /// Returns the key and whether it is computed.
    fn parse_property_key(&mut self) -> Result<(PropertyKey, bool), JsError> {
        let start = self.start_position()?;
        let token = self.lexer.next_token()?;
        let key = match token {
            Token::Identifier(name, _) => PropertyKey::Identifier {
                name,
                span: self.finish_span(start),
            },
            Token::Keyword(keyword) => PropertyKey::Identifier {
                name: keyword.as_str().to_string(),
                span: self.finish_span(start),
            },
            Token::String(value) | Token::BigIntLiteral(value) => PropertyKey::StringLiteral {
                value,
                span: self.finish_span(start),
            },
            Token::Number(value) => PropertyKey::NumericLiteral {
                value,
                span: self.finish_span(start),
            },
            Token::Punctuator(Punctuator::LBracket) => {
                let expression = self.allow_in(|parser| parser.parse_assignment_expression())?;
                self.expect_punctuator(Punctuator::RBracket)?;
                return Ok((
                    PropertyKey::Computed {
                        expression: Box::new(expression),
                        span: self.finish_span(start),
                    },
                    true,
                ));
            }
            _ => return self.unexpected_at(start),
        };
        Ok((key, false))
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    fn parse_binding_target(&mut self) -> Result<Pattern, JsError> {
        match self.lexer.peek_token()? {
            Token::Punctuator(Punctuator::LBracket) => self.parse_array_binding_pattern(),
            Token::Punctuator(Punctuator::LBrace) => self.parse_object_binding_pattern(),
            _ => {
                let (name, span) = self.parse_binding_identifier()?;
                Ok(Pattern::Identifier { name, span })
            }
        }
    }

    /// Binding target with an optional default value
    fn parse_binding_element(&mut self) -> Result<Pattern, JsError> {
        let start = self.start_position()?;
        let target = self.parse_binding_target()?;
        if !self.eat_punctuator(Punctuator::Assign)? {
            return Ok(target);
        }
        let right = self.allow_in(|parser| parser.parse_assignment_expression())?;
        Ok(Pattern::AssignmentPattern {
            left: Box::new(target),
            right: Box::new(right),
            span: self.finish_span(start),
        })
    }

    fn parse_rest_element(&mut self) -> Result<Pattern, JsError> {
        let start = self.start_position()?;
        self.expect_punctuator(Punctuator::Spread)?;
        let argument = self.parse_binding_target()?;
        Ok(Pattern::RestElement {
            argument: Box::new(argument),
            span: self.finish_span(start),
        })
    }

    fn parse_array_binding_pattern(&mut self) -> Result<Pattern, JsError> {
        let start = self.start_position()?;
        self.expect_punctuator(Punctuator::LBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.eat_punctuator(Punctuator::RBracket)? {
                break;
            }
            if self.eat_punctuator(Punctuator::Comma)? {
                elements.push(None);
                continue;
            }
            if self.check_punctuator(Punctuator::Spread)? {
                elements.push(Some(self.parse_rest_element()?));
                self.expect_punctuator(Punctuator::RBracket)?;
                break;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.eat_punctuator(Punctuator::Comma)? {
                self.expect_punctuator(Punctuator::RBracket)?;
                break;
            }
        }
        Ok(Pattern::ArrayPattern {
            elements,
            span: self.finish_span(start),
        })
    }

    fn parse_object_binding_pattern(&mut self) -> Result<Pattern, JsError> {
        let start = self.start_position()?;
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;
        loop {
            if self.eat_punctuator(Punctuator::RBrace)? {
                break;
            }
            if self.check_punctuator(Punctuator::Spread)? {
                rest = Some(Box::new(self.parse_rest_element()?));
                self.expect_punctuator(Punctuator::RBrace)?;
                break;
            }

            let (key, computed) = self.parse_property_key()?;
            let property = if self.eat_punctuator(Punctuator::Colon)? {
                ObjectPatternProperty {
                    key,
                    value: self.parse_binding_element()?,
                    shorthand: false,
                }
            } else {
                let PropertyKey::Identifier { name, span } = &key else {
                    return self.unexpected();
                };
                if computed {
                    return self.unexpected();
                }
                self.check_binding_name(name, &span.start)?;
                let mut value = Pattern::Identifier {
                    name: name.clone(),
                    span: span.clone(),
                };
                if self.eat_punctuator(Punctuator::Assign)? {
                    let right = self.allow_in(|parser| parser.parse_assignment_expression())?;
                    value = Pattern::AssignmentPattern {
                        left: Box::new(value),
                        right: Box::new(right),
                        span: Span::new(span.start.clone(), self.lexer.last_token_end()),
                    };
                }
                ObjectPatternProperty {
                    key,
                    value,
                    shorthand: true,
                }
            };
            properties.push(property);

            if !self.eat_punctuator(Punctuator::Comma)? {
                self.expect_punctuator(Punctuator::RBrace)?;
                break;
            }
        }
        Ok(Pattern::ObjectPattern {
            properties,
            rest,
            span: self.finish_span(start),
        })
    }

    /// Reinterpret an expression parsed ahead of `=>` or `=` as a pattern.
    /// Member expressions are only valid targets when `assign` is set.
    fn expression_to_pattern(&self, expr: Expression, assign: bool) -> Result<Pattern, JsError> {
        match expr {
            Expression::Identifier { name, span } => {
                self.check_binding_name(&name, &span.start)?;
                Ok(Pattern::Identifier { name, span })
            }
            Expression::MemberExpression { .. } if assign => {
                self.check_simple_target(&expr)?;
                Ok(Pattern::MemberExpression {
                    expression: Box::new(expr),
                })
            }
            Expression::AssignmentExpression {
                left,
                operator: AssignmentOperator::Assign,
                right,
                span,
            } => {
                let left = match left {
                    AssignmentTarget::Simple(target) => self.expression_to_pattern(*target, assign)?,
                    AssignmentTarget::Pattern(pattern) if assign => pattern,
                    AssignmentTarget::Pattern(pattern) => {
                        reject_member_targets(&pattern)?;
                        pattern
                    }
                };
                Ok(Pattern::AssignmentPattern {
                    left: Box::new(left),
                    right,
                    span,
                })
            }
            Expression::ArrayExpression { elements, span } => {
                let count = elements.len();
                let mut patterns = Vec::with_capacity(count);
                for (index, element) in elements.into_iter().enumerate() {
                    let pattern = match element {
                        None => None,
                        Some(Expression::SpreadElement { argument, span }) if index + 1 == count => {
                            Some(Pattern::RestElement {
                                argument: Box::new(self.expression_to_pattern(*argument, assign)?),
                                span,
                            })
                        }
                        Some(element) => Some(self.expression_to_pattern(element, assign)?),
                    };
                    patterns.push(pattern);
                }
                Ok(Pattern::ArrayPattern {
                    elements: patterns,
                    span,
                })
            }
            Expression::ObjectExpression { properties, span } => {
                let count = properties.len();
                let mut converted = Vec::with_capacity(count);
                let mut rest = None;
                for (index, property) in properties.into_iter().enumerate() {
                    match property {
                        ObjectProperty::Property {
                            key,
                            value,
                            kind: PropertyKind::Init,
                            method: false,
                            shorthand,
                            ..
                        } => converted.push(ObjectPatternProperty {
                            key,
                            value: self.expression_to_pattern(value, assign)?,
                            shorthand,
                        }),
                        ObjectProperty::SpreadElement { argument, span } if index + 1 == count => {
                            rest = Some(Box::new(Pattern::RestElement {
                                argument: Box::new(self.expression_to_pattern(argument, assign)?),
                                span,
                            }));
                        }
                        ObjectProperty::Property { span, .. }
                        | ObjectProperty::SpreadElement { span, .. } => {
                            return Err(syntax_error("Assigning to rvalue", Some(span.start)));
                        }
                    }
                }
                Ok(Pattern::ObjectPattern {
                    properties: converted,
                    rest,
                    span,
                })
            }
            other => Err(syntax_error(
                "Assigning to rvalue",
                Some(other.span().start.clone()),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let first = self.parse_assignment_expression()?;
        if !self.check_punctuator(Punctuator::Comma)? {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.eat_punctuator(Punctuator::Comma)? {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::SequenceExpression {
            expressions,
            span: self.finish_span(start),
        })
    }

    /// `( Expression )` as used by if, while and switch heads
    fn parse_paren_expression(&mut self) -> Result<Expression, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let expression = self.allow_in(|parser| parser.parse_expression())?;
        self.expect_punctuator(Punctuator::RParen)?;
        Ok(expression)
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        if self.in_generator && self.check_keyword(Keyword::Yield)? {
            return self.parse_yield_expression();
        }

        let start = self.start_position()?;
        let left = self.parse_conditional_expression()?;
        let Some(operator) = self.assignment_operator()? else {
            return Ok(left);
        };
        let target = self.to_assignment_target(left, operator)?;
        self.lexer.next_token()?;
        let right = self.parse_assignment_expression()?;

        Ok(Expression::AssignmentExpression {
            left: target,
            operator,
            right: Box::new(right),
            span: self.finish_span(start),
        })
    }

    fn parse_yield_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        self.lexer.next_token()?;

        let ends_here = self.lexer.has_newline_before()?
            || matches!(
                self.lexer.peek_token()?,
                Token::EOF
                    | Token::Punctuator(
                        Punctuator::RParen
                            | Punctuator::RBracket
                            | Punctuator::RBrace
                            | Punctuator::Comma
                            | Punctuator::Semicolon
                            | Punctuator::Colon
                    )
            );
        let (delegate, argument) = if ends_here {
            (false, None)
        } else {
            let delegate = self.eat_punctuator(Punctuator::Star)?;
            (delegate, Some(Box::new(self.parse_assignment_expression()?)))
        };

        Ok(Expression::YieldExpression {
            argument,
            delegate,
            span: self.finish_span(start),
        })
    }

    fn assignment_operator(&mut self) -> Result<Option<AssignmentOperator>, JsError> {
        let Token::Punctuator(punctuator) = self.lexer.peek_token()? else {
            return Ok(None);
        };
        let operator = match punctuator {
            Punctuator::Assign => AssignmentOperator::Assign,
            Punctuator::PlusEq => AssignmentOperator::AddAssign,
            Punctuator::MinusEq => AssignmentOperator::SubAssign,
            Punctuator::StarEq => AssignmentOperator::MulAssign,
            Punctuator::SlashEq => AssignmentOperator::DivAssign,
            Punctuator::PercentEq => AssignmentOperator::ModAssign,
            Punctuator::StarStarEq => AssignmentOperator::ExpAssign,
            Punctuator::AndEq => AssignmentOperator::BitAndAssign,
            Punctuator::OrEq => AssignmentOperator::BitOrAssign,
            Punctuator::XorEq => AssignmentOperator::BitXorAssign,
            Punctuator::LtLtEq => AssignmentOperator::LeftShiftAssign,
            Punctuator::GtGtEq => AssignmentOperator::RightShiftAssign,
            Punctuator::GtGtGtEq => AssignmentOperator::UnsignedRightShiftAssign,
            Punctuator::AndAndEq => AssignmentOperator::LogicalAndAssign,
            Punctuator::OrOrEq => AssignmentOperator::LogicalOrAssign,
            Punctuator::NullishCoalesceEq => AssignmentOperator::NullishCoalesceAssign,
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    fn to_assignment_target(
        &self,
        expr: Expression,
        operator: AssignmentOperator,
    ) -> Result<AssignmentTarget, JsError> {
        match expr {
            Expression::Identifier { .. } | Expression::MemberExpression { .. } => {
                self.check_simple_target(&expr)?;
                Ok(AssignmentTarget::Simple(Box::new(expr)))
            }
            Expression::ArrayExpression { .. } | Expression::ObjectExpression { .. }
                if operator == AssignmentOperator::Assign =>
            {
                Ok(AssignmentTarget::Pattern(self.expression_to_pattern(expr, true)?))
            }
            other => Err(syntax_error(
                "Assigning to rvalue",
                Some(other.span().start.clone()),
            )),
        }
    }

    /// Identifier or non-optional member expression
    fn check_simple_target(&self, expr: &Expression) -> Result<(), JsError> {
        match expr {
            Expression::Identifier { name, span } => {
                if self.strict_mode && (name == "eval" || name == "arguments") {
                    return Err(syntax_error(
                        format!("Assigning to {} in strict mode", name),
                        Some(span.start.clone()),
                    ));
                }
                Ok(())
            }
            Expression::MemberExpression { span, .. } if in_optional_chain(expr) => Err(
                syntax_error(
                    "Optional chaining cannot appear in left-hand side",
                    Some(span.start.clone()),
                ),
            ),
            Expression::MemberExpression { .. } => Ok(()),
            other => Err(syntax_error(
                "Assigning to rvalue",
                Some(other.span().start.clone()),
            )),
        }
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let test = self.parse_binary_expression(0)?;
        if matches!(test, Expression::ArrowFunctionExpression { .. })
            || !self.eat_punctuator(Punctuator::Question)?
        {
            return Ok(test);
        }

        let consequent = self.allow_in(|parser| parser.parse_assignment_expression())?;
        self.expect_punctuator(Punctuator::Colon)?;
        let alternate = self.parse_assignment_expression()?;

        Ok(Expression::ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.finish_span(start),
        })
    }

    /// Operator-precedence climbing over the binary and logical operators
    fn parse_binary_expression(&mut self, min_precedence: u8) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let mut left = self.parse_unary_expression()?;
        if matches!(left, Expression::ArrowFunctionExpression { .. }) {
            return Ok(left);
        }

        while let Some((operator, precedence)) = self.binary_operator()? {
            if precedence < min_precedence {
                break;
            }
            self.lexer.next_token()?;

            // `**` is right-associative
            let next_precedence = if operator == BinaryOp::Binary(BinaryOperator::Exp) {
                precedence
            } else {
                precedence + 1
            };
            let right = Box::new(self.parse_binary_expression(next_precedence)?);
            let span = self.finish_span(start.clone());
            left = match operator {
                BinaryOp::Binary(operator) => Expression::BinaryExpression {
                    left: Box::new(left),
                    operator,
                    right,
                    span,
                },
                BinaryOp::Logical(operator) => Expression::LogicalExpression {
                    left: Box::new(left),
                    operator,
                    right,
                    span,
                },
            };
        }
        Ok(left)
    }

    fn binary_operator(&mut self) -> Result<Option<(BinaryOp, u8)>, JsError> {
        use BinaryOp::{Binary, Logical};

        let in_for_init = self.in_for_init;
        let operator = match self.lexer.peek_token()? {
            Token::Punctuator(punctuator) => match punctuator {
                Punctuator::NullishCoalesce => (Logical(LogicalOperator::NullishCoalesce), 1),
                Punctuator::OrOr => (Logical(LogicalOperator::Or), 1),
                Punctuator::AndAnd => (Logical(LogicalOperator::And), 2),
                Punctuator::Or => (Binary(BinaryOperator::BitwiseOr), 3),
                Punctuator::Xor => (Binary(BinaryOperator::BitwiseXor), 4),
                Punctuator::And => (Binary(BinaryOperator::BitwiseAnd), 5),
                Punctuator::EqEq => (Binary(BinaryOperator::Eq), 6),
                Punctuator::NotEq => (Binary(BinaryOperator::NotEq), 6),
                Punctuator::EqEqEq => (Binary(BinaryOperator::StrictEq), 6),
                Punctuator::NotEqEq => (Binary(BinaryOperator::StrictNotEq), 6),
                Punctuator::Lt => (Binary(BinaryOperator::Lt), 7),
                Punctuator::Gt => (Binary(BinaryOperator::Gt), 7),
                Punctuator::LtEq => (Binary(BinaryOperator::LtEq), 7),
                Punctuator::GtEq => (Binary(BinaryOperator::GtEq), 7),
                Punctuator::LtLt => (Binary(BinaryOperator::LeftShift), 8),
                Punctuator::GtGt => (Binary(BinaryOperator::RightShift), 8),
                Punctuator::GtGtGt => (Binary(BinaryOperator::UnsignedRightShift), 8),
                Punctuator::Plus => (Binary(BinaryOperator::Add), 9),
                Punctuator::Minus => (Binary(BinaryOperator::Sub), 9),
                Punctuator::Star => (Binary(BinaryOperator::Mul), 10),
                Punctuator::Slash => (Binary(BinaryOperator::Div), 10),
                Punctuator::Percent => (Binary(BinaryOperator::Mod), 10),
                Punctuator::StarStar => (Binary(BinaryOperator::Exp), 11),
                _ => return Ok(None),
            },
            Token::Keyword(Keyword::Instanceof) => (Binary(BinaryOperator::Instanceof), 7),
            Token::Keyword(Keyword::In) if !in_for_init => (Binary(BinaryOperator::In), 7),
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;

        let expr = if let Some(operator) = self.unary_operator()? {
            self.lexer.next_token()?;
            let argument = self.parse_unary_expression()?;
            if operator == UnaryOperator::Delete
                && self.strict_mode
                && matches!(argument, Expression::Identifier { .. })
            {
                return Err(syntax_error(
                    "Deleting local variable in strict mode",
                    Some(start),
                ));
            }
            Expression::UnaryExpression {
                operator,
                argument: Box::new(argument),
                span: self.finish_span(start),
            }
        } else if let Some(operator) = self.update_operator()? {
            self.lexer.next_token()?;
            let argument = self.parse_unary_expression()?;
            self.check_simple_target(&argument)?;
            Expression::UpdateExpression {
                operator,
                argument: Box::new(argument),
                prefix: true,
                span: self.finish_span(start),
            }
        } else if self.in_async && self.check_keyword(Keyword::Await)? {
            self.lexer.next_token()?;
            let argument = self.parse_unary_expression()?;
            Expression::AwaitExpression {
                argument: Box::new(argument),
                span: self.finish_span(start),
            }
        } else {
            let expr = self.parse_left_hand_side_expression()?;
            match self.update_operator()? {
                Some(operator)
                    if !self.lexer.has_newline_before()?
                        && !matches!(expr, Expression::ArrowFunctionExpression { .. }) =>
                {
                    self.check_simple_target(&expr)?;
                    self.lexer.next_token()?;
                    Expression::UpdateExpression {
                        operator,
                        argument: Box::new(expr),
                        prefix: false,
                        span: self.finish_span(start),
                    }
                }
                _ => expr,
            }
        };

        self.plugin.after_unary(&expr)?;
        Ok(expr)
    }

    fn unary_operator(&mut self) -> Result<Option<UnaryOperator>, JsError> {
        let operator = match self.lexer.peek_token()? {
            Token::Punctuator(Punctuator::Minus) => UnaryOperator::Minus,
            Token::Punctuator(Punctuator::Plus) => UnaryOperator::Plus,
            Token::Punctuator(Punctuator::Not) => UnaryOperator::Not,
            Token::Punctuator(Punctuator::Tilde) => UnaryOperator::BitwiseNot,
            Token::Keyword(Keyword::Typeof) => UnaryOperator::Typeof,
            Token::Keyword(Keyword::Void) => UnaryOperator::Void,
            Token::Keyword(Keyword::Delete) => UnaryOperator::Delete,
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    fn update_operator(&mut self) -> Result<Option<UpdateOperator>, JsError> {
        Ok(match self.lexer.peek_token()? {
            Token::Punctuator(Punctuator::PlusPlus) => Some(UpdateOperator::Increment),
            Token::Punctuator(Punctuator::MinusMinus) => Some(UpdateOperator::Decrement),
            _ => None,
        })
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let base = if self.check_keyword(Keyword::New)? {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        if matches!(base, Expression::ArrowFunctionExpression { .. }) {
            return Ok(base);
        }
        self.parse_subscripts(base, start, false)
    }

    fn parse_new_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        self.expect_keyword(Keyword::New)?;

        let callee_start = self.start_position()?;
        let callee = if self.check_keyword(Keyword::New)? {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        let callee = self.parse_subscripts(callee, callee_start, true)?;
        let arguments = if self.check_punctuator(Punctuator::LParen)? {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::NewExpression {
            callee: Box::new(callee),
            arguments,
            span: self.finish_span(start),
        })
    }

    /// Member accesses, calls and tagged templates following `base`
    fn parse_subscripts(
        &mut self,
        mut base: Expression,
        start: SourcePosition,
        no_calls: bool,
    ) -> Result<Expression, JsError> {
        loop {
            if self.eat_punctuator(Punctuator::Dot)? {
                let property = self.parse_member_property()?;
                base = self.member(base, property, false, false, &start);
            } else if self.check_punctuator(Punctuator::OptionalChain)? {
                if no_calls {
                    return Err(syntax_error(
                        "Optional chaining cannot appear in the callee of new expressions",
                        Some(self.start_position()?),
                    ));
                }
                self.lexer.next_token()?;
                if self.check_punctuator(Punctuator::LParen)? {
                    let arguments = self.parse_arguments()?;
                    base = Expression::CallExpression {
                        callee: Box::new(base),
                        arguments,
                        optional: true,
                        span: self.finish_span(start.clone()),
                    };
                } else if self.eat_punctuator(Punctuator::LBracket)? {
                    let property = self.allow_in(|parser| parser.parse_expression())?;
                    self.expect_punctuator(Punctuator::RBracket)?;
                    base = self.member(base, property, true, true, &start);
                } else {
                    let property = self.parse_member_property()?;
                    base = self.member(base, property, false, true, &start);
                }
            } else if self.eat_punctuator(Punctuator::LBracket)? {
                let property = self.allow_in(|parser| parser.parse_expression())?;
                self.expect_punctuator(Punctuator::RBracket)?;
                base = self.member(base, property, true, false, &start);
            } else if !no_calls && self.check_punctuator(Punctuator::LParen)? {
                let arguments = self.parse_arguments()?;
                let is_async_callee =
                    matches!(&base, Expression::Identifier { name, .. } if name == "async");
                if is_async_callee
                    && self.check_punctuator(Punctuator::Arrow)?
                    && !self.lexer.has_newline_before()?
                {
                    let params = self.arguments_to_params(arguments)?;
                    return self.parse_arrow_function(start, params, true);
                }
                base = Expression::CallExpression {
                    callee: Box::new(base),
                    arguments,
                    optional: false,
                    span: self.finish_span(start.clone()),
                };
            } else if matches!(
                self.lexer.peek_token()?,
                Token::TemplateLiteral(_) | Token::TemplateHead(_)
            ) {
                if in_optional_chain(&base) {
                    return Err(syntax_error(
                        "Optional chaining cannot appear in the tag of tagged template expressions",
                        Some(self.start_position()?),
                    ));
                }
                let quasi = self.parse_template_literal()?;
                base = Expression::TaggedTemplateExpression {
                    tag: Box::new(base),
                    quasi: Box::new(quasi),
                    span: self.finish_span(start.clone()),
                };
            } else {
                return Ok(base);
            }
        }
    }

    fn member(
        &self,
        object: Expression,
        property: Expression,
        computed: bool,
        optional: bool,
        start: &SourcePosition,
    ) -> Expression {
        Expression::MemberExpression {
            object: Box::new(object),
            property: Box::new(property),
            computed,
            optional,
            span: self.finish_span(start.clone()),
        }
    }

    /// Property name after `.` or `?.`, possibly a private name
    fn parse_member_property(&mut self) -> Result<Expression, JsError> {
        if matches!(self.lexer.peek_token()?, Token::PrivateName(_)) {
            let name = self.parse_private_name()?;
            if !self.plugin.reference_private_name(&name, &self.options)? {
                return Err(unexpected_token(Some(name.span.start.clone())));
            }
            return Ok(Expression::PrivateName(name));
        }

        let start = self.start_position()?;
        let name = match self.lexer.next_token()? {
            Token::Identifier(name, _) => name,
            Token::Keyword(keyword) => keyword.as_str().to_string(),
            _ => return self.unexpected_at(start),
        };
        Ok(Expression::Identifier {
            name,
            span: self.finish_span(start),
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        self.allow_in(|parser| {
            let mut arguments = Vec::new();
            while !parser.eat_punctuator(Punctuator::RParen)? {
                arguments.push(parser.parse_spread_or_assignment()?);
                if !parser.eat_punctuator(Punctuator::Comma)? {
                    parser.expect_punctuator(Punctuator::RParen)?;
                    break;
                }
            }
            Ok(arguments)
        })
    }

    fn parse_spread_or_assignment(&mut self) -> Result<Expression, JsError> {
        if !self.check_punctuator(Punctuator::Spread)? {
            return self.parse_assignment_expression();
        }
        let start = self.start_position()?;
        self.lexer.next_token()?;
        let argument = self.parse_assignment_expression()?;
        Ok(Expression::SpreadElement {
            argument: Box::new(argument),
            span: self.finish_span(start),
        })
    }

    fn arguments_to_params(&self, arguments: Vec<Expression>) -> Result<Vec<Pattern>, JsError> {
        let count = arguments.len();
        arguments
            .into_iter()
            .enumerate()
            .map(|(index, argument)| match argument {
                Expression::SpreadElement { argument, span } if index + 1 == count => {
                    Ok(Pattern::RestElement {
                        argument: Box::new(self.expression_to_pattern(*argument, false)?),
                        span,
                    })
                }
                other => self.expression_to_pattern(other, false),
            })
            .collect()
    }

    /// A primary expression, reported to the plugin with its following token
    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let atom = self.parse_atom()?;
        let next = self.lexer.peek_token()?;
        self.plugin.after_atom(&atom, next)?;
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let token = self.lexer.peek_token()?.clone();

        match token {
            Token::Keyword(Keyword::This) => {
                self.lexer.next_token()?;
                Ok(Expression::ThisExpression {
                    span: self.finish_span(start),
                })
            }
            Token::Keyword(Keyword::Super) => self.parse_super(start),
            Token::Keyword(Keyword::Function) => self.parse_function_expression(start, false),
            Token::Keyword(Keyword::Async) => self.parse_async_atom(start),
            Token::Keyword(Keyword::Class) => {
                let (name, super_class, body) = self.parse_class(false)?;
                Ok(Expression::ClassExpression {
                    name,
                    super_class,
                    body,
                    span: self.finish_span(start),
                })
            }
            Token::Keyword(Keyword::True) => self.parse_literal(start, Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => self.parse_literal(start, Literal::Boolean(false)),
            Token::Keyword(Keyword::Null) => self.parse_literal(start, Literal::Null),
            Token::Number(value) => self.parse_literal(start, Literal::Number(value)),
            Token::BigIntLiteral(value) => self.parse_literal(start, Literal::BigInt(value)),
            Token::String(value) => self.parse_literal(start, Literal::String(value)),
            Token::TemplateLiteral(_) | Token::TemplateHead(_) => self.parse_template_literal(),
            Token::Punctuator(Punctuator::Slash | Punctuator::SlashEq) => {
                self.lexer.next_token()?;
                let Token::RegExp(pattern, flags) = self.lexer.rescan_regexp()? else {
                    return self.unexpected_at(start);
                };
                Ok(Expression::Literal {
                    value: Literal::RegExp { pattern, flags },
                    span: self.finish_span(start),
                })
            }
            Token::Punctuator(Punctuator::LParen) => self.parse_parenthesized_or_arrow(start),
            Token::Punctuator(Punctuator::LBracket) => self.parse_array_literal(start),
            Token::Punctuator(Punctuator::LBrace) => self.parse_object_literal(start),
            Token::Identifier(..) => self.parse_identifier_or_arrow(start),
            Token::Keyword(keyword) if keyword.is_contextual() => {
                self.parse_identifier_or_arrow(start)
            }
            _ => self.unexpected(),
        }
    }

    fn parse_literal(&mut self, start: SourcePosition, value: Literal) -> Result<Expression, JsError> {
        self.lexer.next_token()?;
        Ok(Expression::Literal {
            value,
            span: self.finish_span(start),
        })
    }

    fn parse_identifier_or_arrow(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        let (name, span) = self.parse_identifier_reference()?;
        if self.check_punctuator(Punctuator::Arrow)? && !self.lexer.has_newline_before()? {
            self.check_binding_name(&name, &span.start)?;
            let params = vec![Pattern::Identifier { name, span }];
            return self.parse_arrow_function(start, params, false);
        }
        Ok(Expression::Identifier { name, span })
    }

    /// `super` may appear in any function or class context; it is always
    /// followed by a call or member access
    fn parse_super(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        self.lexer.next_token()?;
        if self.function_depth == 0 && !self.in_method {
            return Err(syntax_error(
                "'super' keyword outside a method",
                Some(start),
            ));
        }
        if !matches!(
            self.lexer.peek_token()?,
            Token::Punctuator(Punctuator::LParen | Punctuator::Dot | Punctuator::LBracket)
        ) {
            return self.unexpected();
        }
        Ok(Expression::Super {
            span: self.finish_span(start),
        })
    }

    /// `async function`, `async x => ...`, or an identifier named `async`
    fn parse_async_atom(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        let (next, newline) = self.peek_second()?;
        if !newline {
            if next == Token::Keyword(Keyword::Function) {
                self.lexer.next_token()?;
                return self.parse_function_expression(start, true);
            }
            let is_identifier = matches!(next, Token::Identifier(..))
                || matches!(next, Token::Keyword(k) if k.is_contextual());
            if is_identifier {
                self.lexer.next_token()?;
                let (name, span) = self.parse_binding_identifier()?;
                if !self.check_punctuator(Punctuator::Arrow)? || self.lexer.has_newline_before()? {
                    return self.unexpected();
                }
                let params = vec![Pattern::Identifier { name, span }];
                return self.parse_arrow_function(start, params, true);
            }
        }
        self.parse_identifier_or_arrow(start)
    }

    /// `( ... )`: a parenthesized expression or an arrow parameter list.
    /// Parentheses leave no node of their own.
    fn parse_parenthesized_or_arrow(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let prev_for_init = self.in_for_init;
        self.in_for_init = false;
        let result = self.parse_parenthesized_rest(start);
        self.in_for_init = prev_for_init;
        result
    }

    fn parse_parenthesized_rest(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        let inner_start = self.start_position()?;
        let mut items = Vec::new();
        let mut rest = None;
        let mut trailing_comma = false;

        while !self.check_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                rest = Some(self.parse_rest_element()?);
                break;
            }
            items.push(self.parse_assignment_expression()?);
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
            trailing_comma = self.check_punctuator(Punctuator::RParen)?;
        }
        let inner_end = self.lexer.last_token_end();
        self.expect_punctuator(Punctuator::RParen)?;

        if self.check_punctuator(Punctuator::Arrow)? && !self.lexer.has_newline_before()? {
            let mut params = items
                .into_iter()
                .map(|item| self.expression_to_pattern(item, false))
                .collect::<Result<Vec<_>, _>>()?;
            params.extend(rest);
            return self.parse_arrow_function(start, params, false);
        }

        if rest.is_some() || trailing_comma || items.is_empty() {
            return self.unexpected();
        }
        if items.len() == 1 {
            return self.unexpected_if_none(items.pop());
        }
        Ok(Expression::SequenceExpression {
            expressions: items,
            span: Span::new(inner_start, inner_end),
        })
    }

    fn parse_arrow_function(
        &mut self,
        start: SourcePosition,
        params: Vec<Pattern>,
        is_async: bool,
    ) -> Result<Expression, JsError> {
        self.expect_punctuator(Punctuator::Arrow)?;

        let prev_async = self.in_async;
        let prev_generator = self.in_generator;
        let prev_loop_depth = self.loop_depth;
        let prev_switch_depth = self.switch_depth;
        let prev_strict = self.strict_mode;
        self.in_async = is_async;
        self.in_generator = false;
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.function_depth += 1;

        let body = if self.check_punctuator(Punctuator::LBrace)? {
            self.parse_function_body().map(ArrowFunctionBody::Block)
        } else {
            self.parse_assignment_expression()
                .map(|expr| ArrowFunctionBody::Expression(Box::new(expr)))
        };

        self.function_depth -= 1;
        self.in_async = prev_async;
        self.in_generator = prev_generator;
        self.loop_depth = prev_loop_depth;
        self.switch_depth = prev_switch_depth;
        self.strict_mode = prev_strict;

        Ok(Expression::ArrowFunctionExpression {
            params,
            body: body?,
            is_async,
            span: self.finish_span(start),
        })
    }

    fn parse_array_literal(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        self.expect_punctuator(Punctuator::LBracket)?;
        let elements = self.allow_in(|parser| {
            let mut elements = Vec::new();
            loop {
                if parser.eat_punctuator(Punctuator::RBracket)? {
                    break;
                }
                if parser.eat_punctuator(Punctuator::Comma)? {
                    elements.push(None);
                    continue;
                }
                elements.push(Some(parser.parse_spread_or_assignment()?));
                if !parser.eat_punctuator(Punctuator::Comma)? {
                    parser.expect_punctuator(Punctuator::RBracket)?;
                    break;
                }
            }
            Ok(elements)
        })?;
        Ok(Expression::ArrayExpression {
            elements,
            span: self.finish_span(start),
        })
    }

    fn parse_object_literal(&mut self, start: SourcePosition) -> Result<Expression, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let properties = self.allow_in(|parser| {
            let mut properties = Vec::new();
            loop {
                if parser.eat_punctuator(Punctuator::RBrace)? {
                    break;
                }
                properties.push(parser.parse_object_property()?);
                if !parser.eat_punctuator(Punctuator::Comma)? {
                    parser.expect_punctuator(Punctuator::RBrace)?;
                    break;
                }
            }
            Ok(properties)
        })?;
        Ok(Expression::ObjectExpression {
            properties,
            span: self.finish_span(start),
        })
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty, JsError> {
        let start = self.start_position()?;
        if self.eat_punctuator(Punctuator::Spread)? {
            let argument = self.parse_assignment_expression()?;
            return Ok(ObjectProperty::SpreadElement {
                argument,
                span: self.finish_span(start),
            });
        }

        let mut is_async = false;
        if self.check_keyword(Keyword::Async)? {
            let (next, newline) = self.peek_second()?;
            if !newline && !ends_property_name(&next) {
                self.lexer.next_token()?;
                is_async = true;
            }
        }
        let is_generator = self.eat_punctuator(Punctuator::Star)?;
        let mut kind = PropertyKind::Init;
        if !is_async && !is_generator {
            match self.accessor_kind()? {
                Some(MethodKind::Get) => kind = PropertyKind::Get,
                Some(MethodKind::Set) => kind = PropertyKind::Set,
                _ => {}
            }
        }

        let (key, computed) = self.parse_property_key()?;

        if self.check_punctuator(Punctuator::LParen)? {
            let value = self.parse_method_value(is_async, is_generator)?;
            return Ok(ObjectProperty::Property {
                key,
                value,
                kind,
                method: kind == PropertyKind::Init,
                shorthand: false,
                computed,
                span: self.finish_span(start),
            });
        }
        if kind != PropertyKind::Init || is_async || is_generator {
            return self.unexpected();
        }

        if self.eat_punctuator(Punctuator::Colon)? {
            let value = self.parse_assignment_expression()?;
            return Ok(ObjectProperty::Property {
                key,
                value,
                kind,
                method: false,
                shorthand: false,
                computed,
                span: self.finish_span(start),
            });
        }

        // Shorthand `{ a }`, or `{ a = 1 }` as the cover of a pattern
        let (name, span) = match &key {
            PropertyKey::Identifier { name, span } if !computed => (name.clone(), span.clone()),
            _ => return self.unexpected(),
        };
        if let Some(message) =
            reserved_word_message(&name, self.strict_mode, self.options.source_type)
        {
            return Err(syntax_error(message, Some(span.start)));
        }
        let mut value = Expression::Identifier {
            name,
            span: span.clone(),
        };
        if self.eat_punctuator(Punctuator::Assign)? {
            let right = self.parse_assignment_expression()?;
            value = Expression::AssignmentExpression {
                left: AssignmentTarget::Simple(Box::new(value)),
                operator: AssignmentOperator::Assign,
                right: Box::new(right),
                span: self.finish_span(span.start.clone()),
            };
        }
        Ok(ObjectProperty::Property {
            key,
            value,
            kind,
            method: false,
            shorthand: true,
            computed: false,
            span: self.finish_span(start),
        })
    }

    fn parse_template_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.start_position()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        match self.lexer.next_token()? {
            Token::TemplateLiteral(cooked) => quasis.push(TemplateElement { cooked, tail: true }),
            Token::TemplateHead(cooked) => {
                quasis.push(TemplateElement {
                    cooked,
                    tail: false,
                });
                loop {
                    expressions.push(self.allow_in(|parser| parser.parse_expression())?);
                    if !self.check_punctuator(Punctuator::RBrace)? {
                        return self.unexpected();
                    }
                    self.lexer.next_token()?;
                    match self.lexer.read_template_continuation()? {
                        Token::TemplateMiddle(cooked) => quasis.push(TemplateElement {
                            cooked,
                            tail: false,
                        }),
                        Token::TemplateTail(cooked) => {
                            quasis.push(TemplateElement { cooked, tail: true });
                            break;
                        }
                        _ => return self.unexpected_at(start),
                    }
                }
            }
            _ => return self.unexpected_at(start),
        }

        Ok(Expression::TemplateLiteral {
            quasis,
            expressions,
            span: self.finish_span(start),
        })
    }

    // ------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------

    /// Whether the next token can be read as an identifier
    fn at_identifier(&mut self) -> Result<bool, JsError> {
        Ok(match self.lexer.peek_token()? {
            Token::Identifier(..) => true,
            Token::Keyword(keyword) => keyword.is_contextual(),
            _ => false,
        })
    }

    fn parse_identifier_reference(&mut self) -> Result<(String, Span), JsError> {
        let start = self.start_position()?;
        let name = match self.lexer.next_token()? {
            Token::Identifier(name, _) => name,
            Token::Keyword(Keyword::Yield) if self.in_generator => {
                return self.unexpected_at(start);
            }
            Token::Keyword(Keyword::Await) if self.in_async => {
                return self.unexpected_at(start);
            }
            Token::Keyword(keyword) if keyword.is_contextual() => keyword.as_str().to_string(),
            _ => return self.unexpected_at(start),
        };
        if let Some(message) =
            reserved_word_message(&name, self.strict_mode, self.options.source_type)
        {
            return Err(syntax_error(message, Some(start)));
        }
        Ok((name, self.finish_span(start)))
    }

    fn parse_binding_identifier(&mut self) -> Result<(String, Span), JsError> {
        let (name, span) = self.parse_identifier_reference()?;
        self.check_binding_name(&name, &span.start)?;
        Ok((name, span))
    }

    fn check_binding_name(&self, name: &str, start: &SourcePosition) -> Result<(), JsError> {
        if let Some(message) =
            reserved_word_message(name, self.strict_mode, self.options.source_type)
        {
            return Err(syntax_error(message, Some(start.clone())));
        }
        if self.strict_mode && (name == "eval" || name == "arguments") {
            return Err(syntax_error(
                format!("Binding {} in strict mode", name),
                Some(start.clone()),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn start_position(&mut self) -> Result<SourcePosition, JsError> {
        self.lexer.peek_start()
    }

    fn finish_span(&self, start: SourcePosition) -> Span {
        Span::new(start, self.lexer.last_token_end())
    }

    fn is_at_end(&mut self) -> Result<bool, JsError> {
        Ok(matches!(self.lexer.peek_token()?, Token::EOF))
    }

    /// The token after the next one, and whether a newline precedes it
    fn peek_second(&mut self) -> Result<(Token, bool), JsError> {
        let state = self.lexer.snapshot();
        self.lexer.next_token()?;
        let newline = self.lexer.has_newline_before()?;
        let token = self.lexer.peek_token()?.clone();
        self.lexer.restore(state);
        Ok((token, newline))
    }

    fn check_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        Ok(matches!(self.lexer.peek_token()?, Token::Punctuator(x) if *x == p))
    }

    fn check_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        Ok(matches!(self.lexer.peek_token()?, Token::Keyword(x) if *x == k))
    }

    fn check_identifier(&mut self, name: &str) -> Result<bool, JsError> {
        Ok(matches!(self.lexer.peek_token()?, Token::Identifier(x, false) if x == name))
    }

    fn eat_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        if self.check_punctuator(p)? {
            self.lexer.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        if self.check_keyword(k)? {
            self.lexer.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_punctuator(&mut self, p: Punctuator) -> Result<(), JsError> {
        if self.eat_punctuator(p)? {
            return Ok(());
        }
        self.unexpected()
    }

    fn expect_keyword(&mut self, k: Keyword) -> Result<(), JsError> {
        if self.eat_keyword(k)? {
            return Ok(());
        }
        self.unexpected()
    }

    /// Whether a statement may end before the next token (explicit or
    /// inserted semicolon)
    fn at_statement_end(&mut self) -> Result<bool, JsError> {
        Ok(self.lexer.has_newline_before()?
            || matches!(
                self.lexer.peek_token()?,
                Token::EOF | Token::Punctuator(Punctuator::Semicolon | Punctuator::RBrace)
            ))
    }

    fn consume_semicolon(&mut self) -> Result<(), JsError> {
        if self.eat_punctuator(Punctuator::Semicolon)? || self.at_statement_end()? {
            return Ok(());
        }
        self.unexpected()
    }

    /// Run `parse` with the `in` operator allowed
    fn allow_in<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        let prev_for_init = self.in_for_init;
        self.in_for_init = false;
        let result = parse(self);
        self.in_for_init = prev_for_init;
        result
    }

    /// Unexpected-token error at the start of the next token
    fn unexpected<T>(&mut self) -> Result<T, JsError> {
        let position = self.lexer.peek_start()?;
        Err(unexpected_token(Some(position)))
    }

    fn unexpected_at<T>(&self, position: SourcePosition) -> Result<T, JsError> {
        Err(unexpected_token(Some(position)))
    }

    fn unexpected_if_none<T>(&mut self, value: Option<T>) -> Result<T, JsError> {
        match value {
            Some(value) => Ok(value),
            None => self.unexpected(),
        }
    }
}

/// Tokens after which a modifier word is really the property name itself
fn ends_property_name(token: &Token) -> bool {
    matches!(
        token,
        Token::EOF
            | Token::Punctuator(
                Punctuator::LParen
                    | Punctuator::Assign
                    | Punctuator::Semicolon
                    | Punctuator::Comma
                    | Punctuator::Colon
                    | Punctuator::RBrace
            )
    )
}

/// Patterns converted for assignment may hold member targets; bindings may not
fn reject_member_targets(pattern: &Pattern) -> Result<(), JsError> {
    match pattern {
        Pattern::Identifier { .. } => Ok(()),
        Pattern::MemberExpression { expression } => Err(syntax_error(
            "Assigning to rvalue",
            Some(expression.span().start.clone()),
        )),
        Pattern::ObjectPattern {
            properties, rest, ..
        } => {
            for property in properties {
                reject_member_targets(&property.value)?;
            }
            match rest {
                Some(rest) => reject_member_targets(rest),
                None => Ok(()),
            }
        }
        Pattern::ArrayPattern { elements, .. } => elements
            .iter()
            .flatten()
            .try_for_each(reject_member_targets),
        Pattern::AssignmentPattern { left, .. } => reject_member_targets(left),
        Pattern::RestElement { argument, .. } => reject_member_targets(argument),
    }
}

/// Whether a member/call chain contains an optional link
fn in_optional_chain(expr: &Expression) -> bool {
    match expr {
        Expression::MemberExpression {
            object, optional, ..
        } => *optional || in_optional_chain(object),
        Expression::CallExpression {
            callee, optional, ..
        } => *optional || in_optional_chain(callee),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, JsError> {
        Parser::new(source).parse()
    }

    fn first_expression(program: &Program) -> &Expression {
        match &program.body[0] {
            Statement::ExpressionStatement { expression, .. } => expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty() {
        let program = parse("").unwrap();
        assert!(program.body.is_empty());
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse("let x = 42;").unwrap();
        assert!(matches!(
            &program.body[0],
            Statement::VariableDeclaration {
                kind: VariableKind::Let,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("1 + 2 * 3").unwrap();
        match first_expression(&program) {
            Expression::BinaryExpression {
                operator: BinaryOperator::Add,
                right,
                ..
            } => assert!(matches!(
                right.as_ref(),
                Expression::BinaryExpression {
                    operator: BinaryOperator::Mul,
                    ..
                }
            )),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_exponent_right_associative() {
        let program = parse("2 ** 3 ** 2").unwrap();
        match first_expression(&program) {
            Expression::BinaryExpression { left, .. } => {
                assert!(matches!(left.as_ref(), Expression::Literal { .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression_has_no_wrapper() {
        let program = parse("(a.b)").unwrap();
        let expr = first_expression(&program);
        assert!(matches!(expr, Expression::MemberExpression { .. }));
        assert_eq!(expr.span().start.offset, 1);
    }

    #[test]
    fn test_arrow_functions() {
        assert!(parse("x => x * 2").is_ok());
        assert!(parse("(a, b = 1, ...rest) => a").is_ok());
        assert!(parse("async (a) => await a").is_ok());
        assert!(parse("async x => x").is_ok());
        assert!(parse("() => {}").is_ok());
    }

    #[test]
    fn test_regexp_and_division() {
        let program = parse("x = a / b / c; y = /ab+c/gi.test(s)").unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_template_literal() {
        let program = parse("`a${b}c${d + 1}e`").unwrap();
        match first_expression(&program) {
            Expression::TemplateLiteral {
                quasis,
                expressions,
                ..
            } => {
                assert_eq!(quasis.len(), 3);
                assert_eq!(expressions.len(), 2);
                assert!(quasis[2].tail);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_class_members() {
        let source = "class A extends B { static x = 1; y; constructor() { super(); } get z() { return 1 } set z(v) {} static { this.w = 2 } async *gen() {} }";
        let program = parse(source).unwrap();
        match &program.body[0] {
            Statement::ClassDeclaration { body, .. } => assert_eq!(body.body.len(), 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_hash_is_unexpected_without_plugin() {
        let err = parse("class A { #x() {} }").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character '#' (1:10)");
    }

    #[test]
    fn test_super_outside_function() {
        let err = parse("super.x").unwrap_err();
        assert_eq!(err.message, "'super' keyword outside a method");
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse("return 1").unwrap_err();
        assert_eq!(err.message, "'return' outside of function");
    }

    #[test]
    fn test_asi_and_unexpected_token() {
        assert!(parse("a = 1\nb = 2").is_ok());
        let err = parse("a = 1 b = 2").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected token (1:6)");
    }

    #[test]
    fn test_for_loops() {
        assert!(parse("for (let i = 0; i < 10; i++) {}").is_ok());
        assert!(parse("for (const k in obj) {}").is_ok());
        assert!(parse("for (x of xs) break;").is_ok());
    }

    #[test]
    fn test_strict_mode_directive() {
        assert!(parse("var static = 1").is_ok());
        let err = parse("'use strict'; var static = 1").unwrap_err();
        assert_eq!(err.message, "The keyword 'static' is reserved");
    }

    #[test]
    fn test_duplicate_constructor() {
        let err = parse("class A { constructor() {} constructor() {} }").unwrap_err();
        assert_eq!(err.message, "Duplicate constructor in the same class");
    }

    #[test]
    fn test_escaped_async_is_not_modifier() {
        let err = parse(r"class C { \u0061sync m(){} };").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected token (1:21)");
    }

    #[test]
    fn test_object_literal_forms() {
        assert!(parse("o = { a, b: 1, [c]: 2, d() {}, get e() { return 1 }, ...f }").is_ok());
        assert!(parse("({ a = 1 } = {})").is_ok());
    }

    #[test]
    fn test_member_destructuring_targets() {
        assert!(parse("[a.b, c[0], ...d.e] = f").is_ok());
        assert!(parse("({ a: o.p, b: [q.r] = [] } = s)").is_ok());
        assert!(parse("for ({ a: o.p } of xs);").is_ok());

        let err = parse("[a?.b] = c").unwrap_err();
        assert_eq!(err.message, "Optional chaining cannot appear in left-hand side");
        let err = parse("([a.b]) => 1").unwrap_err();
        assert_eq!(err.to_string(), "Assigning to rvalue (1:2)");
        let err = parse("var [a.b] = c").unwrap_err();
        assert_eq!(err.kind, core_types::ErrorKind::SyntaxError);
    }

    #[test]
    fn test_module_source_is_strict() {
        let module = ParserOptions {
            source_type: SourceType::Module,
            ..Default::default()
        };
        let err = Parser::with_options("var x; delete x", module.clone())
            .parse()
            .unwrap_err();
        assert_eq!(err.to_string(), "Deleting local variable in strict mode (1:7)");
        let err = Parser::with_options("var eval", module).parse().unwrap_err();
        assert_eq!(err.to_string(), "Binding eval in strict mode (1:4)");

        assert!(parse("var x; delete x").is_ok());
        assert!(parse("var eval").is_ok());
    }
}
