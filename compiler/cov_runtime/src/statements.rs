//! Built-in statements and the grammar that produces them.

use std::rc::Rc;

use cov_compiler::{
    run_all, CompileError, Compiler, Executor, Method, MethodKind, Statement, StatementError,
    TranslateMode,
};
use cov_ir::{Action, ExprTree, Signal, TokenId, TokenKind, TreeIter};
use cov_value::Var;

fn indent(out: &mut String, depth: usize) {
    out.push_str(&"  ".repeat(depth));
}

/// A bare expression evaluated for its effects.
pub struct ExpressionStatement {
    line: usize,
    tree: ExprTree,
}

impl Statement for ExpressionStatement {
    fn kind(&self) -> &'static str {
        "expression"
    }

    fn line(&self) -> usize {
        self.line
    }

    fn run(&self, exec: &mut dyn Executor) -> Result<(), StatementError> {
        exec.eval(&self.tree)
            .map(drop)
            .map_err(|err| StatementError::new(self.line, err))
    }

    fn dump(&self, compiler: &Compiler, out: &mut String, depth: usize) {
        indent(out, depth);
        out.push_str(&compiler.dump_expr(&self.tree));
        out.push('\n');
    }
}

/// `var a = 1, b` declares each name in the current scope, in order.
/// Names without an initializer start out null.
pub struct VarStatement {
    line: usize,
    declarations: Vec<(String, Option<ExprTree>)>,
}

impl Statement for VarStatement {
    fn kind(&self) -> &'static str {
        "var"
    }

    fn line(&self) -> usize {
        self.line
    }

    fn run(&self, exec: &mut dyn Executor) -> Result<(), StatementError> {
        for (name, init) in &self.declarations {
            let value = match init {
                Some(tree) => exec.eval(tree),
                None => Ok(Var::null()),
            };
            value
                .and_then(|value| exec.declare_var(name, value, false))
                .map_err(|err| StatementError::new(self.line, err))?;
        }
        Ok(())
    }

    fn dump(&self, compiler: &Compiler, out: &mut String, depth: usize) {
        indent(out, depth);
        out.push_str("var ");
        let parts: Vec<String> = self
            .declarations
            .iter()
            .map(|(name, init)| match init {
                Some(tree) => format!("{name} = {}", compiler.dump_expr(tree)),
                None => name.clone(),
            })
            .collect();
        out.push_str(&parts.join(", "));
        out.push('\n');
    }
}

/// Scope shared by a `block` statement and a `namespace` statement.
fn run_scoped(
    line: usize,
    name: &str,
    declare: bool,
    body: &[Box<dyn Statement>],
    exec: &mut dyn Executor,
) -> Result<(), StatementError> {
    exec.enter_domain(name, declare)
        .map_err(|err| StatementError::new(line, err))?;
    let result = run_all(body, exec);
    let left = exec
        .leave_domain(false)
        .map_err(|err| StatementError::new(line, err));
    result.and(left)
}

fn dump_body(
    compiler: &Compiler,
    head: &str,
    body: &[Box<dyn Statement>],
    out: &mut String,
    depth: usize,
) {
    indent(out, depth);
    out.push_str(head);
    out.push('\n');
    for stmt in body {
        stmt.dump(compiler, out, depth + 1);
    }
    indent(out, depth);
    out.push_str("end\n");
}

/// An anonymous temporary scope.
pub struct BlockStatement {
    line: usize,
    body: Vec<Box<dyn Statement>>,
}

impl Statement for BlockStatement {
    fn kind(&self) -> &'static str {
        "block"
    }

    fn line(&self) -> usize {
        self.line
    }

    fn run(&self, exec: &mut dyn Executor) -> Result<(), StatementError> {
        run_scoped(self.line, "<block>", false, &self.body, exec)
    }

    fn dump(&self, compiler: &Compiler, out: &mut String, depth: usize) {
        dump_body(compiler, "block", &self.body, out, depth);
    }
}

/// A named persistent scope, bound as a namespace value in its parent.
pub struct NamespaceStatement {
    line: usize,
    name: String,
    body: Vec<Box<dyn Statement>>,
}

impl Statement for NamespaceStatement {
    fn kind(&self) -> &'static str {
        "namespace"
    }

    fn line(&self) -> usize {
        self.line
    }

    fn run(&self, exec: &mut dyn Executor) -> Result<(), StatementError> {
        run_scoped(self.line, &self.name, true, &self.body, exec)
    }

    fn dump(&self, compiler: &Compiler, out: &mut String, depth: usize) {
        dump_body(
            compiler,
            &format!("namespace {}", self.name),
            &self.body,
            out,
            depth,
        );
    }
}

struct ExpressionMethod;

impl Method for ExpressionMethod {
    fn kind(&self) -> MethodKind {
        MethodKind::Single
    }

    fn translate(
        &self,
        compiler: &mut Compiler,
        line: &[TokenId],
        mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        let tree = compiler.expr_at(line, 0)?;
        Ok(Box::new(ExpressionStatement {
            line: compiler.line_number(line),
            tree: compiler.prepare_expr(tree, mode)?,
        }))
    }
}

struct VarMethod;

impl VarMethod {
    fn collect(
        compiler: &Compiler,
        tree: &ExprTree,
        it: TreeIter,
        out: &mut Vec<(String, Option<ExprTree>)>,
    ) -> Result<(), CompileError> {
        let id = *tree.data(it)?;
        match compiler.pool().kind(id) {
            Some(TokenKind::Signal(Signal::Com)) => {
                Self::collect(compiler, tree, tree.left(it)?, out)?;
                Self::collect(compiler, tree, tree.right(it)?, out)
            }
            Some(TokenKind::Id(name)) => {
                out.push((name.clone(), None));
                Ok(())
            }
            Some(TokenKind::Signal(Signal::Asi)) => {
                let target = *tree.data(tree.left(it)?)?;
                let Some(TokenKind::Id(name)) = compiler.pool().kind(target) else {
                    return Err(CompileError::new("Wrong grammar for variable definition."));
                };
                out.push((name.clone(), Some(tree.from_subtree(tree.right(it)?)?)));
                Ok(())
            }
            _ => Err(CompileError::new("Wrong grammar for variable definition.")),
        }
    }
}

impl Method for VarMethod {
    fn kind(&self) -> MethodKind {
        MethodKind::Single
    }

    fn translate(
        &self,
        compiler: &mut Compiler,
        line: &[TokenId],
        mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        let tree = compiler.expr_at(line, 1)?;
        let tree = compiler.prepare_expr(tree, mode)?;
        let mut declarations = Vec::new();
        Self::collect(compiler, &tree, tree.root(), &mut declarations)?;
        Ok(Box::new(VarStatement {
            line: compiler.line_number(line),
            declarations,
        }))
    }
}

struct BlockMethod;

impl Method for BlockMethod {
    fn kind(&self) -> MethodKind {
        MethodKind::BlockBegin
    }

    fn translate_block(
        &self,
        compiler: &mut Compiler,
        line: &[TokenId],
        body: Vec<Box<dyn Statement>>,
        _mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        Ok(Box::new(BlockStatement {
            line: compiler.line_number(line),
            body,
        }))
    }
}

struct NamespaceMethod;

impl Method for NamespaceMethod {
    fn kind(&self) -> MethodKind {
        MethodKind::BlockBegin
    }

    fn translate_block(
        &self,
        compiler: &mut Compiler,
        line: &[TokenId],
        body: Vec<Box<dyn Statement>>,
        _mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        let tree = compiler.expr_at(line, 1)?;
        let name = match compiler.root_identifier(&tree) {
            Some(name) if tree.len() == 1 => name.to_owned(),
            _ => return Err(CompileError::new("Namespace name must be an identifier.")),
        };
        Ok(Box::new(NamespaceStatement {
            line: compiler.line_number(line),
            name,
            body,
        }))
    }
}

struct EndMethod;

impl Method for EndMethod {
    fn kind(&self) -> MethodKind {
        MethodKind::BlockEnd
    }
}

/// Register the built-in statement grammars on `compiler`.
pub fn install_grammar(compiler: &mut Compiler) {
    let expr = || TokenKind::Expr(ExprTree::new());
    compiler
        .add_method(vec![expr(), TokenKind::Endline], Rc::new(ExpressionMethod))
        .add_method(
            vec![TokenKind::Action(Action::Var), expr(), TokenKind::Endline],
            Rc::new(VarMethod),
        )
        .add_method(
            vec![TokenKind::Action(Action::Block), TokenKind::Endline],
            Rc::new(BlockMethod),
        )
        .add_method(
            vec![TokenKind::Action(Action::Namespace), expr(), TokenKind::Endline],
            Rc::new(NamespaceMethod),
        )
        .add_method(
            vec![TokenKind::Action(Action::End), TokenKind::Endline],
            Rc::new(EndMethod),
        );
}
