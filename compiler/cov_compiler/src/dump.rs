//! Textual rendering of expression trees.

use std::fmt::Write;

use cov_ir::{ExprTree, TokenKind, TreeIter};
use cov_value::{ensure_sufficient_stack, Var};

use crate::Compiler;

fn literal(value: &Var) -> String {
    if value.is_type_of::<String>() {
        format!("{:?}", value.to_string())
    } else if value.is_type_of::<char>() {
        format!("'{value}'")
    } else {
        value.to_string()
    }
}

impl Compiler {
    /// Render `tree` as an s-expression: leaves print as themselves and
    /// operators as `(op left right)`, omitting absent operands.
    pub fn dump_expr(&self, tree: &ExprTree) -> String {
        let mut out = String::new();
        self.dump_node(tree, tree.root(), &mut out);
        out
    }

    fn dump_list(&self, open: &str, trees: &[ExprTree], out: &mut String) {
        out.push_str(open);
        for tree in trees {
            out.push(' ');
            self.dump_node(tree, tree.root(), out);
        }
        out.push(')');
    }

    fn dump_node(&self, tree: &ExprTree, it: TreeIter, out: &mut String) {
        let Ok(&id) = tree.data(it) else {
            out.push_str("<empty>");
            return;
        };
        ensure_sufficient_stack(|| match self.pool.kind(id) {
            None => out.push_str("<null>"),
            Some(TokenKind::Id(name)) => out.push_str(name),
            Some(TokenKind::Value(value)) => out.push_str(&literal(value)),
            Some(TokenKind::Signal(signal)) => {
                let _ = write!(out, "({signal}");
                for child in [tree.left(it), tree.right(it)].into_iter().flatten() {
                    if tree.usable(child) {
                        out.push(' ');
                        self.dump_node(tree, child, out);
                    }
                }
                out.push(')');
            }
            Some(TokenKind::Expr(inner)) => {
                out.push_str("(expr ");
                self.dump_node(inner, inner.root(), out);
                out.push(')');
            }
            Some(TokenKind::Arglist(trees)) => self.dump_list("(args", trees, out),
            Some(TokenKind::Array(trees)) => self.dump_list("(array", trees, out),
            Some(TokenKind::Parallel(trees)) => self.dump_list("(parallel", trees, out),
            Some(other) => {
                let _ = write!(out, "<{:?}>", other.tag());
            }
        });
    }
}
