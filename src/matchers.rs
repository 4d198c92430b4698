use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::names::DataFunction;
use crate::returns::unwrap_parens;
use crate::session::FunctionHandle;

/// How a data function was written in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionShape {
    /// `function getStaticProps() {}`
    Declaration,
    /// `const getStaticProps = () => {}`
    Arrow,
}

/// A matched data function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FunctionTarget {
    pub(crate) kind: DataFunction,
    pub(crate) shape: FunctionShape,
    pub(crate) handle: FunctionHandle,
}

// -----------------------------------------------------------------------------
// Data functions
// -----------------------------------------------------------------------------

#[derive(Default)]
struct DataFunctionCollector {
    targets: Vec<FunctionTarget>,
}

impl DataFunctionCollector {
    fn record(&mut self, name: &str, shape: FunctionShape, handle: Option<FunctionHandle>) {
        let (Some(kind), Some(handle)) = (DataFunction::from_name(name), handle) else {
            return;
        };
        self.targets.push(FunctionTarget {
            kind,
            shape,
            handle,
        });
    }
}

struct Declarations(DataFunctionCollector);

impl Visit for Declarations {
    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.0.record(
            &n.ident.sym,
            FunctionShape::Declaration,
            FunctionHandle::of_function(&n.function),
        );
        n.visit_children_with(self);
    }
}

struct Arrows(DataFunctionCollector);

impl Visit for Arrows {
    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        if let (Pat::Ident(binding), Some(Expr::Arrow(arrow))) = (&n.name, n.init.as_deref()) {
            self.0.record(
                &binding.id.sym,
                FunctionShape::Arrow,
                FunctionHandle::of_arrow(arrow),
            );
        }
        n.visit_children_with(self);
    }
}

/// `function <data function>() {}` anywhere in the module, in source order.
pub(crate) fn data_function_declarations(module: &Module) -> Vec<FunctionTarget> {
    let mut collector = Declarations(DataFunctionCollector::default());
    module.visit_with(&mut collector);
    collector.0.targets
}

/// `<data function> = () => {}` declarators anywhere in the module, in
/// source order.
pub(crate) fn data_function_arrows(module: &Module) -> Vec<FunctionTarget> {
    let mut collector = Arrows(DataFunctionCollector::default());
    module.visit_with(&mut collector);
    collector.0.targets
}

// -----------------------------------------------------------------------------
// Page component
// -----------------------------------------------------------------------------

fn function_expr_handle(expr: &Expr) -> Option<FunctionHandle> {
    match unwrap_parens(expr) {
        Expr::Arrow(arrow) => FunctionHandle::of_arrow(arrow),
        Expr::Fn(fn_expr) => FunctionHandle::of_function(&fn_expr.function),
        _ => None,
    }
}

/// The function the page renders, found through its default export.
///
/// Handles `export default function ...`, `export default <arrow>` and
/// `export default Name` where `Name` is a top-level (optionally exported)
/// function declaration or a variable initialized with a function. When
/// several declarations match `Name`, the last one wins.
pub(crate) fn page_component(module: &Module) -> Option<FunctionHandle> {
    let default_export = module.body.iter().find_map(|item| match item {
        ModuleItem::ModuleDecl(decl @ (ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_))) => {
            Some(decl)
        }
        _ => None,
    })?;

    match default_export {
        ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            decl: DefaultDecl::Fn(fn_expr),
            ..
        }) => FunctionHandle::of_function(&fn_expr.function),
        ModuleDecl::ExportDefaultExpr(ExportDefaultExpr { expr, .. }) => match unwrap_parens(expr) {
            Expr::Ident(name) => named_component(&module.body, &name.sym),
            other => function_expr_handle(other),
        },
        _ => None,
    }
}

fn named_component(body: &[ModuleItem], name: &str) -> Option<FunctionHandle> {
    let mut found = None;

    for item in body {
        let decl = match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => &export.decl,
            _ => continue,
        };

        match decl {
            Decl::Fn(fn_decl) if fn_decl.ident.sym.as_ref() == name => {
                found = FunctionHandle::of_function(&fn_decl.function).or(found);
            }
            Decl::Var(var) => {
                let Some(declarator) = var.decls.first() else {
                    continue;
                };
                let Pat::Ident(binding) = &declarator.name else {
                    continue;
                };
                if binding.id.sym.as_ref() != name {
                    continue;
                }
                if let Some(handle) = declarator.init.as_deref().and_then(function_expr_handle) {
                    found = Some(handle);
                }
            }
            _ => {}
        }
    }

    found
}

// -----------------------------------------------------------------------------
// Literal values
// -----------------------------------------------------------------------------

/// Value of a `getStaticPaths` `fallback` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fallback {
    Bool(bool),
    Blocking,
}

impl Fallback {
    pub(crate) fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Lit(Lit::Bool(value)) => Some(Self::Bool(value.value)),
            Expr::Lit(Lit::Str(value)) if &*value.value == "blocking" => Some(Self::Blocking),
            _ => None,
        }
    }

    /// Whether paths not listed up front are still rendered on demand.
    pub(crate) fn dynamic_params(self) -> bool {
        matches!(self, Self::Bool(true) | Self::Blocking)
    }
}

/// Whole seconds of a numeric `revalidate` value; fractions are truncated.
pub(crate) fn revalidate_seconds(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Lit(Lit::Num(number)) if number.value.is_finite() => Some(number.value.trunc() as i64),
        _ => None,
    }
}
