#![no_main]

use libfuzzer_sys::fuzz_target;
use symexpr::symbolic::{
    BinaryOperator, ExpressionType, LogicalOperator, SymbolicExpression,
};

const BINARY: [BinaryOperator; 12] = [
    BinaryOperator::Add,
    BinaryOperator::Sub,
    BinaryOperator::Mul,
    BinaryOperator::Div,
    BinaryOperator::Mod,
    BinaryOperator::Eq,
    BinaryOperator::Ne,
    BinaryOperator::Lt,
    BinaryOperator::Le,
    BinaryOperator::Gt,
    BinaryOperator::Ge,
    BinaryOperator::ArrayGet,
];

const LOGICAL: [LogicalOperator; 4] = [
    LogicalOperator::And,
    LogicalOperator::Or,
    LogicalOperator::Not,
    LogicalOperator::Implies,
];

fn leaf(byte: u8) -> SymbolicExpression {
    match byte % 5 {
        0 => SymbolicExpression::int(i64::from(byte)),
        1 => SymbolicExpression::bool(byte & 0x80 != 0),
        2 => SymbolicExpression::variable(format!("i{}", byte >> 4), ExpressionType::int()),
        3 => SymbolicExpression::variable(format!("b{}", byte >> 4), ExpressionType::bool()),
        _ => SymbolicExpression::variable(
            format!("a{}", byte >> 4),
            ExpressionType::array(ExpressionType::int()),
        ),
    }
}

// Interprets the input as a stack program; ill-typed steps must be rejected, never panic.
fuzz_target!(|data: &[u8]| {
    let mut stack: Vec<SymbolicExpression> = Vec::new();

    for chunk in data.chunks(2) {
        let op = chunk[0];
        let arg = chunk.get(1).copied().unwrap_or(0);

        let built = match op % 5 {
            0 => Ok(leaf(arg)),
            1 => match stack.pop() {
                Some(operand) => SymbolicExpression::neg(operand),
                None => continue,
            },
            2 => match (stack.pop(), stack.pop()) {
                (Some(right), Some(left)) => {
                    SymbolicExpression::binary(BINARY[usize::from(arg) % BINARY.len()], left, right)
                }
                _ => continue,
            },
            3 => {
                let count = usize::from(arg % 4).min(stack.len());
                let operands = stack.split_off(stack.len() - count);
                let operator = LOGICAL[usize::from(arg >> 4) % LOGICAL.len()];
                SymbolicExpression::logical(operator, operands)
            }
            _ => match (stack.pop(), stack.pop(), stack.pop()) {
                (Some(else_branch), Some(then_branch), Some(condition)) => {
                    SymbolicExpression::if_else(condition, then_branch, else_branch)
                }
                _ => continue,
            },
        };

        if let Ok(expr) = built {
            let rendered = expr.to_string();
            assert!(!rendered.is_empty());
            assert!(expr.node_count() > expr.depth());
            if expr.variables().is_ok() {
                stack.push(expr);
            }
        }
    }
});
