//! Operator tables for the expression parser.
//!
//! Binary operators carry two binding powers, `(left, right)`. The parser only
//! folds an operator in when its left power is above the current floor, and
//! parses the right hand side with the right power as the new floor. Equal
//! powers make an operator left associative; a right power one below the left
//! one makes it right associative, as with `..` and `^`.

use self::super::{lexer::Symbol, syntax::{BinaryOp, UnaryOp}};

/// The binding power of every unary operator. It sits between the
/// multiplicative operators and `^`, so `-2^2` is `-(2^2)` while `-2*2` is
/// `(-2)*2`.
pub const UNARY_PRIORITY: u8 = 8;

pub static UNARY_OPERATORS: [(Symbol, UnaryOp); 3] = [
	(Symbol::Minus, UnaryOp::Negate),
	(Symbol::Not, UnaryOp::Not),
	(Symbol::Hash, UnaryOp::Length)
];

pub static BINARY_OPERATORS: [(Symbol, BinaryOp); 15] = [
	(Symbol::Or, BinaryOp::Or),
	(Symbol::And, BinaryOp::And),
	(Symbol::EqualEqual, BinaryOp::Equal),
	(Symbol::TildeEqual, BinaryOp::NotEqual),
	(Symbol::Less, BinaryOp::Less),
	(Symbol::Greater, BinaryOp::Greater),
	(Symbol::LessEqual, BinaryOp::LessEqual),
	(Symbol::GreaterEqual, BinaryOp::GreaterEqual),
	(Symbol::DotDot, BinaryOp::Concat),
	(Symbol::Plus, BinaryOp::Add),
	(Symbol::Minus, BinaryOp::Subtract),
	(Symbol::Star, BinaryOp::Multiply),
	(Symbol::Slash, BinaryOp::Divide),
	(Symbol::Percent, BinaryOp::Mod),
	(Symbol::Caret, BinaryOp::Power)
];

pub static BINARY_PRIORITIES: [(BinaryOp, (u8, u8)); 15] = [
	(BinaryOp::Or, (1, 1)),
	(BinaryOp::And, (2, 2)),
	(BinaryOp::Less, (3, 3)),
	(BinaryOp::Greater, (3, 3)),
	(BinaryOp::LessEqual, (3, 3)),
	(BinaryOp::GreaterEqual, (3, 3)),
	(BinaryOp::NotEqual, (3, 3)),
	(BinaryOp::Equal, (3, 3)),
	(BinaryOp::Concat, (5, 4)),
	(BinaryOp::Add, (6, 6)),
	(BinaryOp::Subtract, (6, 6)),
	(BinaryOp::Multiply, (7, 7)),
	(BinaryOp::Divide, (7, 7)),
	(BinaryOp::Mod, (7, 7)),
	(BinaryOp::Power, (9, 8))
];

pub fn unary_operator(symbol: Symbol) -> Option<UnaryOp> {
	UNARY_OPERATORS.iter()
		.find(|(candidate, _)| *candidate == symbol)
		.map(|(_, operator)| *operator)
}

pub fn binary_operator(symbol: Symbol) -> Option<BinaryOp> {
	BINARY_OPERATORS.iter()
		.find(|(candidate, _)| *candidate == symbol)
		.map(|(_, operator)| *operator)
}

/// The `(left, right)` binding powers of `operator`.
pub fn priority(operator: BinaryOp) -> (u8, u8) {
	BINARY_PRIORITIES.iter()
		.find(|(candidate, _)| *candidate == operator)
		.map(|(_, priority)| *priority)
		.unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
	use self::super::{
		BINARY_OPERATORS, UNARY_PRIORITY,
		binary_operator, priority, unary_operator
	};
	use crate::ast::{lexer::Symbol, syntax::{BinaryOp, UnaryOp}};

	#[test]
	fn every_binary_operator_has_a_priority() {
		BINARY_OPERATORS.iter()
			.for_each(|(_, operator)| assert_ne!(priority(*operator), (0, 0)));
	}

	#[test]
	fn right_associative_operators() {
		assert_eq!(priority(BinaryOp::Concat), (5, 4));
		assert_eq!(priority(BinaryOp::Power), (9, 8));
	}

	#[test]
	fn unary_sits_between_factor_and_power() {
		assert!(priority(BinaryOp::Multiply).0 < UNARY_PRIORITY);
		assert!(priority(BinaryOp::Power).0 > UNARY_PRIORITY);
	}

	#[test]
	fn minus_is_both() {
		assert_eq!(unary_operator(Symbol::Minus), Some(UnaryOp::Negate));
		assert_eq!(binary_operator(Symbol::Minus), Some(BinaryOp::Subtract));
		assert_eq!(binary_operator(Symbol::Not), None);
		assert_eq!(unary_operator(Symbol::Tilde), None);
	}
}
