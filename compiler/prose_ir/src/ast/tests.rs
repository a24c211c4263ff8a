use super::*;
use crate::Position;
use pretty_assertions::assert_eq;

fn ident(name: &str, line: u32, column: u32) -> Ident {
    Ident::new(name, Position::new(line, column))
}

#[test]
fn precedence_table_orders_levels() {
    assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
    assert!(BinaryOp::And.precedence() < BinaryOp::Eq.precedence());
    assert_eq!(BinaryOp::Eq.precedence(), BinaryOp::GtEq.precedence());
    assert!(BinaryOp::Lt.precedence() < BinaryOp::Add.precedence());
    assert_eq!(BinaryOp::Add.precedence(), BinaryOp::Sub.precedence());
    assert!(BinaryOp::Sub.precedence() < BinaryOp::Mul.precedence());
    assert_eq!(BinaryOp::Mul.precedence(), BinaryOp::Mod.precedence());
}

#[test]
fn operator_symbols() {
    assert_eq!(BinaryOp::NotEq.to_string(), "!=");
    assert_eq!(BinaryOp::And.as_symbol(), "&&");
    assert_eq!(UnaryOp::Not.to_string(), "!");
}

#[test]
fn member_expression_reports_member_position() {
    let expr = Expr::Member {
        object: Box::new(Expr::Identifier(ident("p", 1, 1))),
        member: ident("x", 1, 3),
    };
    assert_eq!(expr.pos(), Position::new(1, 3));
}

#[test]
fn type_node_display() {
    let node = TypeNode::Function {
        params: vec![
            TypeNode::Simple(ident("integer", 1, 10)),
            TypeNode::List(Box::new(TypeNode::Simple(ident("string", 1, 24)))),
        ],
        ret: Box::new(TypeNode::Simple(ident("boolean", 1, 36))),
    };
    assert_eq!(
        node.to_string(),
        "function(integer, list<string>) -> boolean"
    );
}

#[test]
fn declarations_are_hoisted_kinds() {
    let import = Stmt::Import(ImportDecl::Module {
        module: ident("math", 1, 8),
    });
    let write = Stmt::Write {
        value: Expr::Literal {
            value: Literal::Integer(1),
            pos: Position::START,
        },
        newline: false,
    };
    assert!(import.is_declaration());
    assert!(!write.is_declaration());
}

#[test]
fn selective_import_exposes_module_name() {
    let import = ImportDecl::Selective {
        module: ident("geometry", 1, 6),
        names: vec![ident("area", 1, 22)],
    };
    assert_eq!(import.module().as_str(), "geometry");
}
