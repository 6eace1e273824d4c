//! Arithmetic evaluation.
//!
//! Supports `+ - * / % ^`, parentheses, unary signs, and decimals. `^` is
//! right-associative and binds tighter than unary minus, so `-2^2` is `-4`.

use super::BuiltinSkill;
use crate::skills::SkillMetadata;
use crate::tools::names::CALCULATE;
use crate::tools::{FnTool, Tool};
use crate::{ToolDef, json_schema_for};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Arguments for the `calculate` tool.
#[derive(Deserialize, JsonSchema)]
pub struct CalculateArgs {
    /// Arithmetic expression, e.g. `(3 + 4) * 2 ^ 3`.
    pub expression: String,
}

pub fn skill() -> BuiltinSkill {
    BuiltinSkill::new(
        SkillMetadata::new(
            "calculator",
            "Evaluate arithmetic expressions (add, subtract, multiply, divide, powers, modulo)",
        )
        .with_version("1.0.0")
        .with_tags(["math"]),
        vec![calculate_tool()],
    )
}

pub fn calculate_tool() -> Arc<dyn Tool> {
    let def = ToolDef::new(
        CALCULATE,
        "Evaluate an arithmetic expression and return the numeric result. \
         Supports + - * / % ^ and parentheses.",
        json_schema_for::<CalculateArgs>(),
    );
    Arc::new(FnTool::new(def, |args: CalculateArgs| async move {
        match evaluate(&args.expression) {
            Ok(value) => format!("{} = {}", args.expression.trim(), format_number(value)),
            Err(e) => format!("Error: {e}"),
        }
    }))
}

/// Deepest nesting of parentheses, signs, and exponents accepted.
const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    if parser.chars.is_empty() {
        return Err("empty expression".into());
    }
    let value = parser.expr()?;
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected '{c}' at position {}", parser.pos));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".into());
    }
    Ok(value)
}

/// Print integral values without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err("division by zero".into());
                }
                value /= rhs;
            } else if self.eat('%') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err("modulo by zero".into());
                }
                value %= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    /// Every recursive path re-enters here, so the depth is capped once.
    fn unary(&mut self) -> Result<f64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".into());
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, String> {
        if self.eat('-') {
            Ok(-self.unary()?)
        } else if self.eat('+') {
            self.unary()
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<f64, String> {
        if self.eat('(') {
            let value = self.expr()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".into());
            }
            return Ok(value);
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return match self.peek() {
                Some(c) => Err(format!("unexpected '{c}' at position {}", self.pos)),
                None => Err("unexpected end of expression".into()),
            };
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{literal}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(evaluate("2 ^ -1").unwrap(), 0.5);
        assert_eq!(evaluate("10 % 4 - 1").unwrap(), 1.0);
        assert_eq!(evaluate("1.5 * 4").unwrap(), 6.0);
    }

    #[test]
    fn errors_are_reported() {
        assert_eq!(evaluate("1 / 0").unwrap_err(), "division by zero");
        assert_eq!(evaluate("").unwrap_err(), "empty expression");
        assert!(evaluate("(1 + 2").unwrap_err().contains("parenthesis"));
        assert!(evaluate("2 + x").unwrap_err().contains("unexpected 'x'"));
        assert!(evaluate("1..2").unwrap_err().contains("invalid number"));
    }

    #[test]
    fn deep_nesting_is_rejected_without_overflow() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(evaluate(&parens).unwrap_err(), "expression nested too deeply");

        let signs = format!("{}1", "-".repeat(100_000));
        assert_eq!(evaluate(&signs).unwrap_err(), "expression nested too deeply");

        let powers = vec!["2"; 100_000].join("^");
        assert_eq!(evaluate(&powers).unwrap_err(), "expression nested too deeply");

        let modest = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(evaluate(&modest).unwrap(), 1.0);
        assert_eq!(evaluate("--1").unwrap(), 1.0);
    }

    #[test]
    fn integral_results_print_without_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[tokio::test]
    async fn tool_formats_result() {
        let tool = calculate_tool();
        let out = tool.execute(r#"{"expression": "6 * 7"}"#).await;
        assert_eq!(out, "6 * 7 = 42");
        let out = tool.execute(r#"{"expression": "1/0"}"#).await;
        assert_eq!(out, "Error: division by zero");
    }
}
