use crate::Compiler;
use cov_ir::TokenId;
use pretty_assertions::assert_eq;

fn tree(source: &str) -> String {
    let mut compiler = Compiler::default();
    let tree = compiler.build_expr(source).unwrap();
    compiler.dump_expr(&tree)
}

fn error(source: &str) -> String {
    let mut compiler = Compiler::default();
    compiler.build_expr(source).unwrap_err().what()
}

#[test]
fn precedence() {
    assert_eq!(tree("1 + 2 * 3"), "(+ 1 (* 2 3))");
    assert_eq!(tree("1 * 2 + 3"), "(+ (* 1 2) 3)");
    assert_eq!(tree("a < b == c > d"), "(== (< a b) (> c d))");
    assert_eq!(tree("!a && b || c"), "(|| (&& (! a) b) c)");
    assert_eq!(tree("a = b + 1, c = 2"), "(, (= a (+ b 1)) (= c 2))");
}

#[test]
fn associativity() {
    assert_eq!(tree("a - b - c"), "(- (- a b) c)");
    assert_eq!(tree("a = b = c"), "(= a (= b c))");
    assert_eq!(tree("2 ^ 3 ^ 2"), "(^ 2 (^ 3 2))");
    assert_eq!(tree("a.b.c"), "(. (. a b) c)");
}

#[test]
fn prefix_and_postfix() {
    assert_eq!(tree("-a * b"), "(* (-val a) b)");
    assert_eq!(tree("a * -b"), "(* a (-val b))");
    assert_eq!(tree("a = -b + c"), "(= a (+ (-val b) c))");
    assert_eq!(tree("-x.y"), "(-val (. x y))");
    assert_eq!(tree("x++ + ++y"), "(+ (++ x) (++ y))");
    assert_eq!(tree("*p = &v"), "(= (*val p) (& v))");
}

#[test]
fn postfix_keeps_operand_on_the_left() {
    let mut compiler = Compiler::default();
    let postfix = compiler.build_expr("x++").unwrap();
    let root = postfix.root();
    assert!(!postfix.left(root).unwrap().is_null());
    assert!(postfix.right(root).unwrap().is_null());

    let prefix = compiler.build_expr("++x").unwrap();
    let root = prefix.root();
    assert!(prefix.left(root).unwrap().is_null());
    assert!(!prefix.right(root).unwrap().is_null());
}

#[test]
fn calls_indexes_and_lists() {
    assert_eq!(tree("f(x, y + 1)"), "(fcall f (args x (+ y 1)))");
    assert_eq!(tree("f()"), "(fcall f (args))");
    assert_eq!(tree("a.f(1)[0]"), "(access (fcall (. a f) (args 1)) (expr 0))");
    assert_eq!(tree("a[i + 1]"), "(access a (expr (+ i 1)))");
    assert_eq!(tree("(1 + 2) * 3"), "(* (expr (+ 1 2)) 3)");
    assert_eq!(tree("{1, {2}}"), "(array 1 (array 2))");
    assert_eq!(tree("(a, b)"), "(parallel a b)");
    assert_eq!(tree("c ? a : b"), "(? c (: a b))");
}

#[test]
fn empty_source_builds_empty_tree() {
    let mut compiler = Compiler::default();
    assert!(compiler.build_expr("").unwrap().is_empty());
}

#[test]
fn malformed_expressions() {
    assert_eq!(error("a b"), "Missing operator between operands.");
    assert_eq!(error("a +"), "Missing operand after \"+\".");
    assert_eq!(error("+ a"), "Missing operand before \"+\".");
    assert_eq!(error("(a"), "Lack of the corresponding bracket.");
    assert_eq!(error("a)"), "Parentheses do not match.");
    assert_eq!(error("(a]"), "Parentheses do not match.");
    assert_eq!(error("f(a,)"), "Empty element in list.");
    assert_eq!(error("()"), "Empty expression in parentheses.");
    assert_eq!(error("a[1, 2]"), "Index operator takes exactly one index.");
}

#[test]
fn failed_builds_release_their_tokens() {
    let mut compiler = Compiler::default();
    compiler.build_expr("a + 1").unwrap();
    let before = compiler.pool().len();
    assert!(compiler.build_expr("a + (b").is_err());
    assert_eq!(compiler.pool().len(), before);
}

#[test]
fn signal_levels() {
    let mut compiler = Compiler::default();
    let sum = compiler.build_expr("a + b").unwrap();
    let plus = *sum.data(sum.root()).unwrap();
    let a = *sum.data(sum.left(sum.root()).unwrap()).unwrap();

    let product = compiler.build_expr("a * b").unwrap();
    let times = *product.data(product.root()).unwrap();
    assert!(compiler.get_signal_level(plus).unwrap() < compiler.get_signal_level(times).unwrap());
    assert!(compiler.is_left_associative(plus).unwrap());

    assert_eq!(
        compiler.get_signal_level(TokenId::INVALID).unwrap_err().what(),
        "Get the level of null token."
    );
    assert_eq!(
        compiler.get_signal_level(a).unwrap_err().what(),
        "Get the level of non-signal token."
    );
}
