use swc_core::{
    common::{
        comments::{Comments, SingleThreadedComments},
        sync::Lrc,
        FileName, FilePathMapping, SourceMap, Span,
    },
    ecma::{
        ast::*,
        codegen::to_code_default,
        parser::{parse_file_as_module, Syntax, TsSyntax},
        utils::drop_span,
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::error::{Error, Result};
use crate::options::TransformOptions;

// -----------------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------------

/// Every page is parsed as TSX, whatever its extension.
pub(crate) fn tsx_syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: true,
        ..Default::default()
    })
}

fn parse_module(
    cm: &Lrc<SourceMap>,
    file: &str,
    source: &str,
    comments: Option<&dyn Comments>,
) -> Result<Module> {
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom(file.to_string())),
        source.to_string(),
    );
    let mut recovered = vec![];

    let module = parse_file_as_module(&fm, tsx_syntax(), EsVersion::EsNext, comments, &mut recovered)
        .map_err(|err| Error::Parse {
            file: file.to_string(),
            message: err.kind().msg().to_string(),
        })?;

    if !recovered.is_empty() {
        tracing::debug!(file, count = recovered.len(), "parser recovered from errors");
    }

    Ok(module)
}

/// Parses a fixed code template into module items with every span dropped,
/// so nothing synthesized from it can be mistaken for a node of the page.
pub(crate) fn parse_template(template: &str) -> Vec<ModuleItem> {
    let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));

    match parse_module(&cm, "template.tsx", template, None) {
        Ok(module) => drop_span(module).body,
        Err(err) => {
            tracing::error!(%err, "code template does not parse");
            vec![]
        }
    }
}

// -----------------------------------------------------------------------------
// Function handles
// -----------------------------------------------------------------------------

/// Identity of a parsed function node: the source span of its `Function` or
/// `ArrowExpr`. Only matchers hand these out, and only for parsed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FunctionHandle(Span);

impl FunctionHandle {
    pub(crate) fn of_function(function: &Function) -> Option<Self> {
        Self::from_span(function.span)
    }

    pub(crate) fn of_arrow(arrow: &ArrowExpr) -> Option<Self> {
        Self::from_span(arrow.span)
    }

    fn from_span(span: Span) -> Option<Self> {
        if span.is_dummy() {
            None
        } else {
            Some(Self(span))
        }
    }
}

/// Mutable view of a located function.
pub(crate) enum FunctionMut<'a> {
    Function(&'a mut Function),
    Arrow(&'a mut ArrowExpr),
}

struct Locate<F, R> {
    handle: FunctionHandle,
    apply: Option<F>,
    result: Option<R>,
}

impl<F, R> VisitMut for Locate<F, R>
where
    F: FnOnce(FunctionMut<'_>) -> R,
{
    fn visit_mut_function(&mut self, n: &mut Function) {
        if self.apply.is_none() {
            return;
        }
        if n.span == self.handle.0 {
            if let Some(apply) = self.apply.take() {
                self.result = Some(apply(FunctionMut::Function(n)));
            }
            return;
        }
        n.visit_mut_children_with(self);
    }

    fn visit_mut_arrow_expr(&mut self, n: &mut ArrowExpr) {
        if self.apply.is_none() {
            return;
        }
        if n.span == self.handle.0 {
            if let Some(apply) = self.apply.take() {
                self.result = Some(apply(FunctionMut::Arrow(n)));
            }
            return;
        }
        n.visit_mut_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Rewrite session
// -----------------------------------------------------------------------------

/// Exclusive owner of one page's syntax tree for the duration of a transform.
///
/// All mutations go through these methods. Functions are reached by handle
/// through a fresh search of the current tree, so a node that has been
/// spliced out can no longer be modified.
pub(crate) struct RewriteSession {
    cm: Lrc<SourceMap>,
    comments: SingleThreadedComments,
    module: Module,
    options: TransformOptions,
}

impl RewriteSession {
    pub(crate) fn parse(file: &str, source: &str, options: TransformOptions) -> Result<Self> {
        let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let comments = SingleThreadedComments::default();
        let module = parse_module(&cm, file, source, Some(&comments as &dyn Comments))?;

        Ok(Self {
            cm,
            comments,
            module,
            options,
        })
    }

    pub(crate) fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub(crate) fn module(&self) -> &Module {
        &self.module
    }

    pub(crate) fn body(&self) -> &[ModuleItem] {
        &self.module.body
    }

    pub(crate) fn insert_item(&mut self, index: usize, item: ModuleItem) {
        self.insert_items(index, vec![item]);
    }

    pub(crate) fn insert_items(&mut self, index: usize, items: Vec<ModuleItem>) {
        let index = index.min(self.module.body.len());
        self.module.body.splice(index..index, items);
    }

    pub(crate) fn push_item(&mut self, item: ModuleItem) {
        self.module.body.push(item);
    }

    pub(crate) fn replace_body(&mut self, body: Vec<ModuleItem>) {
        self.module.body = body;
    }

    /// Runs `apply` on the function identified by `handle`, if it is still
    /// part of the tree.
    pub(crate) fn with_function<R>(
        &mut self,
        handle: FunctionHandle,
        apply: impl FnOnce(FunctionMut<'_>) -> R,
    ) -> Option<R> {
        let mut locate = Locate {
            handle,
            apply: Some(apply),
            result: None,
        };
        self.module.visit_mut_with(&mut locate);
        locate.result
    }

    pub(crate) fn print(&self) -> String {
        to_code_default(
            self.cm.clone(),
            Some(&self.comments as &dyn Comments),
            &self.module,
        )
    }
}

// -----------------------------------------------------------------------------
// Positional queries
// -----------------------------------------------------------------------------

fn index_after_last(body: &[ModuleItem], predicate: impl Fn(&ModuleItem) -> bool) -> usize {
    body.iter().rposition(predicate).map_or(0, |index| index + 1)
}

/// Index right after the last import declaration, or 0.
pub(crate) fn first_index_after_imports(body: &[ModuleItem]) -> usize {
    index_after_last(body, |item| {
        matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_)))
    })
}

/// Index right after the last `function name`, `export function name` or
/// `export const name = ...` statement, or 0.
pub(crate) fn first_index_after_named_declaration(body: &[ModuleItem], name: &str) -> usize {
    index_after_last(body, |item| match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Fn(fn_decl))) => fn_decl.ident.sym.as_ref() == name,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
            Decl::Fn(fn_decl) => fn_decl.ident.sym.as_ref() == name,
            Decl::Var(var) => first_declarator_name(var) == Some(name),
            _ => false,
        },
        _ => false,
    })
}

pub(crate) fn first_declarator_name(var: &VarDecl) -> Option<&str> {
    match var.decls.first().map(|decl| &decl.name) {
        Some(Pat::Ident(binding)) => Some(binding.id.sym.as_ref()),
        _ => None,
    }
}

fn var_binds(var: &VarDecl, name: &str) -> bool {
    var.decls.iter().any(|declarator| {
        matches!(&declarator.name, Pat::Ident(binding) if binding.id.sym.as_ref() == name)
    })
}

fn decl_binds(decl: &Decl, name: &str) -> bool {
    match decl {
        Decl::Fn(fn_decl) => fn_decl.ident.sym.as_ref() == name,
        Decl::Class(class_decl) => class_decl.ident.sym.as_ref() == name,
        Decl::Var(var) => var_binds(var, name),
        Decl::TsTypeAlias(alias) => alias.id.sym.as_ref() == name,
        Decl::TsInterface(interface) => interface.id.sym.as_ref() == name,
        _ => false,
    }
}

/// Whether any top-level statement, exported or not, declares `name`.
pub(crate) fn declares_top_level(body: &[ModuleItem], name: &str) -> bool {
    body.iter().any(|item| match item {
        ModuleItem::Stmt(Stmt::Decl(decl)) => decl_binds(decl, name),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => decl_binds(&export.decl, name),
        _ => false,
    })
}

/// Whether the module has `export const|let|var name = ...`.
pub(crate) fn has_exported_variable(body: &[ModuleItem], name: &str) -> bool {
    body.iter().any(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Var(var),
            ..
        })) => var_binds(var, name),
        _ => false,
    })
}
