//! `calculate` — evaluate an arithmetic expression.
//!
//! Supports `+ - * / % ^`, parentheses, unary signs, decimals, and the constants
//! `pi` and `e`. `^` is right-associative and binds tighter than unary minus, so
//! `-2^2` is `-4`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{require_string, Tool, ToolArgs};

pub struct CalculateTool;

#[async_trait]
impl Tool for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Run a math expression"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The math expression to evaluate like \"2 * 3 + (21 / 2) ^ 2\""
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<Value> {
        let expression = require_string(&args, "expression")?;
        let value = evaluate(&expression)?;
        Ok(number_to_json(value))
    }
}

/// Integral results come back as JSON integers so `2+2*5` reads as `12`, not `12.0`.
fn number_to_json(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Longest expression accepted, in characters.
const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest nesting of parentheses, signs and exponents the parser will follow.
const MAX_DEPTH: usize = 256;

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> anyhow::Result<f64> {
    let len = expression.chars().count();
    if len > MAX_EXPRESSION_LEN {
        anyhow::bail!("expression too long ({len} chars, max {MAX_EXPRESSION_LEN})");
    }
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        anyhow::bail!("empty expression");
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(tok) = parser.peek() {
        anyhow::bail!("unexpected token {tok:?} at position {}", parser.pos);
    }
    if !value.is_finite() {
        anyhow::bail!("result is not a finite number");
    }
    Ok(value)
}

// ─────────────────────────────────────────────
// Lexer
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> anyhow::Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("invalid number '{text}'"))?;
                tokens.push(Token::Num(n));
            }
            'a'..='z' | 'A'..='Z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect::<String>().to_lowercase();
                let n = match ident.as_str() {
                    "pi" => std::f64::consts::PI,
                    "e" => std::f64::consts::E,
                    _ => anyhow::bail!("unknown identifier '{ident}'"),
                };
                tokens.push(Token::Num(n));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => anyhow::bail!("unexpected character '{other}'"),
        }
    }

    Ok(tokens)
}

// ─────────────────────────────────────────────
// Parser (recursive descent)
// ─────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        self.pos += 1;
        tok
    }

    /// Run `f` one nesting level deeper, refusing to go past `MAX_DEPTH`.
    fn nested(&mut self, f: fn(&mut Self) -> anyhow::Result<f64>) -> anyhow::Result<f64> {
        if self.depth >= MAX_DEPTH {
            anyhow::bail!("expression nested too deeply (max depth {MAX_DEPTH})");
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> anyhow::Result<f64> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> anyhow::Result<f64> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => anyhow::bail!("division by zero"),
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> anyhow::Result<f64> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    // power := primary ('^' unary)?
    fn power(&mut self) -> anyhow::Result<f64> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.nested(Self::unary)?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> anyhow::Result<f64> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => anyhow::bail!("missing closing parenthesis"),
                }
            }
            Some(tok) => anyhow::bail!("unexpected token {tok:?}"),
            None => anyhow::bail!("unexpected end of expression"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2+2*5").unwrap(), 12.0);
        assert_eq!(evaluate("(2+2)*5").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("7 % 4 * 2").unwrap(), 6.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(evaluate("2^3^2").unwrap(), 512.0);
        assert_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_eq!(evaluate("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn test_example_from_schema() {
        // 6 + 10.5^2
        assert!(approx(evaluate("2 * 3 + (21 / 2) ^ 2").unwrap(), 116.25));
    }

    #[test]
    fn test_constants() {
        assert!(approx(evaluate("2 * pi").unwrap(), std::f64::consts::TAU));
        assert!(approx(evaluate("E").unwrap(), std::f64::consts::E));
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 + ").is_err());
        assert!(evaluate("2 $ 3").is_err());
        assert!(evaluate("sqrt(4)").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("1 2").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let parens = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        let err = evaluate(&parens).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));

        let signs = format!("{}1", "-".repeat(300));
        assert!(evaluate(&signs).unwrap_err().to_string().contains("nested too deeply"));

        let powers = format!("{}2", "2^".repeat(300));
        assert!(evaluate(&powers).unwrap_err().to_string().contains("nested too deeply"));

        let within = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&within).unwrap(), 1.0);
        assert_eq!(evaluate(&format!("{}1", "-".repeat(100))).unwrap(), 1.0);
    }

    #[test]
    fn test_length_limit() {
        let long = format!("{}1", "1+".repeat(600));
        let err = evaluate(&long).unwrap_err();
        assert!(err.to_string().contains("expression too long"));
    }

    #[tokio::test]
    async fn test_tool_returns_integer_json() {
        let mut args = ToolArgs::new();
        args.insert("expression".into(), json!("2+2*5"));
        assert_eq!(CalculateTool.execute(args).await.unwrap(), json!(12));

        let mut args = ToolArgs::new();
        args.insert("expression".into(), json!("1/4"));
        assert_eq!(CalculateTool.execute(args).await.unwrap(), json!(0.25));
    }

    #[tokio::test]
    async fn test_tool_requires_expression() {
        let err = CalculateTool.execute(ToolArgs::new()).await.unwrap_err();
        assert!(err.to_string().contains("expression"));
    }

    #[test]
    fn test_definition() {
        let def = CalculateTool.to_definition();
        assert_eq!(def.function.name, "calculate");
        assert_eq!(def.function.parameters["required"][0], "expression");
    }
}
