use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitMut, VisitWith},
};

use crate::factories::call;
use crate::session::FunctionMut;

pub(crate) fn unwrap_parens(mut expr: &Expr) -> &Expr {
    while let Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    expr
}

// -----------------------------------------------------------------------------
// Collecting a function's own returns
// -----------------------------------------------------------------------------

/// Return statements of the visited body, not of the functions nested in it.
#[derive(Default)]
struct OwnReturns {
    args: Vec<Option<Box<Expr>>>,
}

impl Visit for OwnReturns {
    fn visit_return_stmt(&mut self, n: &ReturnStmt) {
        self.args.push(n.arg.clone());
    }

    fn visit_function(&mut self, _: &Function) {}

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_class(&mut self, _: &Class) {}
}

fn own_returns(body: &BlockStmt) -> Vec<Option<Box<Expr>>> {
    let mut collector = OwnReturns::default();
    body.visit_children_with(&mut collector);
    collector.args
}

/// Arguments of every return of `function`. An arrow's expression body
/// counts as a single return.
pub(crate) fn return_arguments(function: FunctionMut<'_>) -> Vec<Option<Box<Expr>>> {
    match function {
        FunctionMut::Function(function) => function.body.as_ref().map(own_returns).unwrap_or_default(),
        FunctionMut::Arrow(arrow) => match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => own_returns(block),
            BlockStmtOrExpr::Expr(expr) => vec![Some(expr.clone())],
        },
    }
}

/// A data function can be folded into `getData` only when every return hands
/// back an object literal without spreads.
pub(crate) fn is_inlineable(return_args: &[Option<Box<Expr>>]) -> bool {
    return_args.iter().all(|arg| {
        arg.as_deref().is_some_and(|arg| match unwrap_parens(arg) {
            Expr::Object(object) => object
                .props
                .iter()
                .all(|prop| matches!(prop, PropOrSpread::Prop(_))),
            _ => false,
        })
    })
}

struct PropertyValues<'k> {
    key: &'k str,
    values: Vec<Expr>,
}

impl Visit for PropertyValues<'_> {
    fn visit_key_value_prop(&mut self, n: &KeyValueProp) {
        if matches!(&n.key, PropName::Ident(key) if key.sym.as_ref() == self.key) {
            self.values.push((*n.value).clone());
        }
        n.visit_children_with(self);
    }
}

/// Values of every `key: value` property anywhere inside the return
/// arguments, in source order.
pub(crate) fn property_values(return_args: &[Option<Box<Expr>>], key: &str) -> Vec<Expr> {
    let mut finder = PropertyValues { key, values: vec![] };
    for arg in return_args.iter().flatten() {
        arg.visit_with(&mut finder);
    }
    finder.values
}

// -----------------------------------------------------------------------------
// Rewriting
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    Props,
    Redirect,
    NotFound,
}

/// Rewrites `{ props }`, `{ redirect: { destination } }` and
/// `{ notFound }` return objects into what an app-router loader returns or
/// calls, and records which navigation helpers that needed.
#[derive(Debug, Default)]
pub(crate) struct ReturnRewriter {
    pub(crate) used_redirect: bool,
    pub(crate) used_not_found: bool,
    /// Properties of rewritten objects that were discarded, `revalidate`
    /// excluded.
    pub(crate) dropped: Vec<String>,
}

impl ReturnRewriter {
    fn rewrite_argument(&mut self, arg: &Expr) -> Option<Expr> {
        let Expr::Object(object) = unwrap_parens(arg) else {
            return None;
        };

        let mut rewrite: Option<(Rewrite, Expr)> = None;
        let mut skipped = vec![];

        for prop in &object.props {
            let Some((key, value)) = named_property(prop) else {
                skipped.push(property_label(prop));
                continue;
            };

            match key {
                "props" => rewrite = Some((Rewrite::Props, value)),
                "redirect" => match redirect_destination(&value) {
                    Some(destination) => {
                        rewrite = Some((Rewrite::Redirect, call("redirect", vec![destination])))
                    }
                    None => skipped.push(key.to_string()),
                },
                "notFound" => rewrite = Some((Rewrite::NotFound, call("notFound", vec![]))),
                other => skipped.push(other.to_string()),
            }
        }

        let (kind, replacement) = rewrite?;
        match kind {
            Rewrite::Redirect => self.used_redirect = true,
            Rewrite::NotFound => self.used_not_found = true,
            Rewrite::Props => {}
        }

        // revalidate is migrated to a route segment export separately
        for key in skipped.into_iter().filter(|key| key != "revalidate") {
            tracing::warn!(key = %key, "dropping return key with no app router counterpart");
            self.dropped.push(key);
        }

        Some(replacement)
    }
}

impl VisitMut for ReturnRewriter {
    fn visit_mut_return_stmt(&mut self, n: &mut ReturnStmt) {
        let Some(arg) = &mut n.arg else {
            return;
        };
        if let Some(replacement) = self.rewrite_argument(arg) {
            *arg = Box::new(replacement);
        }
    }

    fn visit_mut_function(&mut self, _: &mut Function) {}

    fn visit_mut_arrow_expr(&mut self, _: &mut ArrowExpr) {}

    fn visit_mut_class(&mut self, _: &mut Class) {}
}

fn named_property(prop: &PropOrSpread) -> Option<(&str, Expr)> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    match &**prop {
        Prop::KeyValue(KeyValueProp {
            key: PropName::Ident(key),
            value,
        }) => Some((key.sym.as_ref(), (**value).clone())),
        Prop::Shorthand(ident) => Some((ident.sym.as_ref(), Expr::Ident(ident.clone()))),
        _ => None,
    }
}

/// How a property that cannot be rewritten is named in warnings.
fn property_label(prop: &PropOrSpread) -> String {
    let PropOrSpread::Prop(prop) = prop else {
        return "...".to_string();
    };
    let key = match &**prop {
        Prop::Shorthand(ident) => return ident.sym.to_string(),
        Prop::Assign(AssignProp { key, .. }) => return key.sym.to_string(),
        Prop::KeyValue(KeyValueProp { key, .. }) => key,
        Prop::Getter(GetterProp { key, .. }) => key,
        Prop::Setter(SetterProp { key, .. }) => key,
        Prop::Method(MethodProp { key, .. }) => key,
    };
    match key {
        PropName::Ident(ident) => ident.sym.to_string(),
        PropName::Str(str) => str.value.to_string(),
        PropName::Num(num) => num.value.to_string(),
        _ => "[computed]".to_string(),
    }
}

fn redirect_destination(redirect: &Expr) -> Option<Box<Expr>> {
    let Expr::Object(object) = unwrap_parens(redirect) else {
        return None;
    };

    object.props.iter().find_map(|prop| {
        let (key, value) = named_property(prop)?;
        if key != "destination" {
            return None;
        }
        match value {
            Expr::Lit(Lit::Str(_)) | Expr::Ident(_) => Some(Box::new(value)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use swc_core::ecma::visit::VisitMutWith;

    use super::*;
    use crate::session::parse_template;

    fn function(source: &str) -> Function {
        match parse_template(source).into_iter().next() {
            Some(ModuleItem::Stmt(Stmt::Decl(Decl::Fn(fn_decl)))) => *fn_decl.function,
            _ => panic!("expected a function declaration"),
        }
    }

    fn returned(body: &BlockStmt) -> Vec<Expr> {
        own_returns(body)
            .into_iter()
            .map(|arg| *arg.expect("return without argument"))
            .collect()
    }

    fn callee_name(expr: &Expr) -> Option<&str> {
        match expr {
            Expr::Call(CallExpr {
                callee: Callee::Expr(callee),
                ..
            }) => match &**callee {
                Expr::Ident(ident) => Some(ident.sym.as_ref()),
                _ => None,
            },
            _ => None,
        }
    }

    #[test]
    fn rewrites_props_redirect_and_not_found() {
        let mut function = function(
            r#"
            function getStaticProps() {
                if (a) return { redirect: { destination: "/x", permanent: false } };
                if (b) return { notFound: true };
                return { props: { a: 1 } };
            }
            "#,
        );
        let body = function.body.as_mut().unwrap();

        let mut rewriter = ReturnRewriter::default();
        body.visit_mut_children_with(&mut rewriter);

        assert!(rewriter.used_redirect);
        assert!(rewriter.used_not_found);

        let returns = returned(body);
        assert_eq!(callee_name(&returns[0]), Some("redirect"));
        assert_eq!(callee_name(&returns[1]), Some("notFound"));
        let Expr::Object(props) = &returns[2] else {
            panic!("props should be unwrapped");
        };
        assert_eq!(props.props.len(), 1);
    }

    #[test]
    fn leaves_nested_functions_and_unknown_shapes_alone() {
        let mut function = function(
            r#"
            function getStaticProps() {
                const items = list.map((item) => { return { props: item }; });
                if (a) return { redirect: { destination: `/${a}` } };
                return { props: { items } };
            }
            "#,
        );
        let body = function.body.as_mut().unwrap();

        let mut rewriter = ReturnRewriter::default();
        body.visit_mut_children_with(&mut rewriter);

        assert!(!rewriter.used_redirect);
        let returns = returned(body);
        assert_eq!(returns.len(), 2);
        assert!(matches!(&returns[0], Expr::Object(object) if object.props.len() == 1));
    }

    #[test]
    fn only_object_literal_returns_are_inlineable() {
        let literal = function("function f() { if (a) return ({ props: {} }); return { notFound: true }; }");
        assert!(is_inlineable(&own_returns(literal.body.as_ref().unwrap())));

        let variable = function("function f() { const res = { props: {} }; return res; }");
        assert!(!is_inlineable(&own_returns(variable.body.as_ref().unwrap())));

        let bare = function("function f() { if (a) return; return { props: {} }; }");
        assert!(!is_inlineable(&own_returns(bare.body.as_ref().unwrap())));
    }

    #[test]
    fn object_spreads_are_not_inlineable() {
        let spread = function("function f() { const base = load(); return { ...base, props: { a: 1 } }; }");
        assert!(!is_inlineable(&own_returns(spread.body.as_ref().unwrap())));

        let branch = function("function f() { if (x) return { ...base, props: {} }; return { props: {} }; }");
        assert!(!is_inlineable(&own_returns(branch.body.as_ref().unwrap())));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn warns_about_every_dropped_property() {
        let mut function = function(
            r#"
            function getStaticProps() {
                if (a) return { props: {}, redirect: { destination: `/x/${id}` } };
                if (b) return { ...base, "x-cache": 1, [key]: 2, notFound: true };
                return { props: {}, revalidate: 60, extra: true };
            }
            "#,
        );
        let body = function.body.as_mut().unwrap();

        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut rewriter = ReturnRewriter::default();
        tracing::subscriber::with_default(subscriber, || body.visit_mut_children_with(&mut rewriter));

        assert_eq!(
            rewriter.dropped,
            vec!["redirect", "...", "x-cache", "[computed]", "extra"]
        );
        assert!(!rewriter.used_redirect);
        assert!(rewriter.used_not_found);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 5);
        assert!(output.contains("key=redirect"));
        assert!(output.contains("key=..."));
        assert!(output.contains("key=x-cache"));
        assert!(!output.contains("key=revalidate"));
    }

    #[test]
    fn finds_properties_inside_returns() {
        let function = function(
            "function f() { if (a) return { props: {}, revalidate: 10 }; return { props: {}, revalidate: 60 }; }",
        );
        let args = own_returns(function.body.as_ref().unwrap());

        let values = property_values(&args, "revalidate");
        assert_eq!(values.len(), 2);
        assert!(matches!(&values[1], Expr::Lit(Lit::Num(n)) if n.value == 60.0));
        assert!(property_values(&args, "fallback").is_empty());
    }
}
