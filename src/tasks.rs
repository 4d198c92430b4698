use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::{ast::*, utils::drop_span, visit::VisitMutWith},
};

use crate::factories::{
    binding, bool_lit, exported_const, generate_static_params_function, get_data_binding,
    get_data_function, get_data_wrapper, import_declaration, is_page_props_pattern,
    legacy_ctx_declaration, num_lit, page_params_type_aliases, page_props_pattern, param,
    str_lit, type_ref_annotation,
};
use crate::matchers::{
    data_function_arrows, data_function_declarations, page_component, revalidate_seconds,
    Fallback, FunctionTarget,
};
use crate::names::{
    DataFunction, GENERATE_STATIC_PARAMS, GET_DATA, NEXT, NEXT_HEADERS, NEXT_NAVIGATION,
    PAGE_PROPS,
};
use crate::returns::{is_inlineable, property_values, return_arguments, unwrap_parens, ReturnRewriter};
use crate::scheduler::{LazyMod, ModOutcome};
use crate::session::{
    declares_top_level, first_index_after_imports, first_index_after_named_declaration,
    has_exported_variable, FunctionHandle, FunctionMut, RewriteSession,
};

/// Named imports a rewrite needs from one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportRequest {
    pub(crate) specifiers: Vec<String>,
    pub(crate) source: String,
}

impl ImportRequest {
    pub(crate) fn new(specifiers: &[&str], source: impl Into<String>) -> Self {
        Self {
            specifiers: specifiers.iter().map(|name| name.to_string()).collect(),
            source: source.into(),
        }
    }
}

/// Every step of the migration, with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Task {
    FindFunctionDeclarations,
    FindArrowFunctionExpressions,
    FindReturnStatements(FunctionTarget),
    FindFallbackObjectProperty(FunctionTarget),
    FindRevalidateObjectProperty(FunctionTarget),
    FindComponentFunctionDefinition,
    AddGenerateStaticParams,
    AddDynamicExport,
    AddDynamicParamsExport(Fallback),
    AddRevalidateExport(i64),
    AddGetDataInline(FunctionTarget),
    AddGetDataWrapper(FunctionTarget),
    AddGetDataVariableDeclaration(FunctionHandle),
    AddImport(ImportRequest),
    AddPageParamsTypeAlias,
}

impl LazyMod for Task {
    type Context = RewriteSession;

    fn name(&self) -> &'static str {
        match self {
            Task::FindFunctionDeclarations => "find_function_declarations",
            Task::FindArrowFunctionExpressions => "find_arrow_function_expressions",
            Task::FindReturnStatements(_) => "find_return_statements",
            Task::FindFallbackObjectProperty(_) => "find_fallback_object_property",
            Task::FindRevalidateObjectProperty(_) => "find_revalidate_object_property",
            Task::FindComponentFunctionDefinition => "find_component_function_definition",
            Task::AddGenerateStaticParams => "add_generate_static_params",
            Task::AddDynamicExport => "add_dynamic_export",
            Task::AddDynamicParamsExport(_) => "add_dynamic_params_export",
            Task::AddRevalidateExport(_) => "add_revalidate_export",
            Task::AddGetDataInline(_) => "add_get_data_inline",
            Task::AddGetDataWrapper(_) => "add_get_data_wrapper",
            Task::AddGetDataVariableDeclaration(_) => "add_get_data_variable_declaration",
            Task::AddImport(_) => "add_import",
            Task::AddPageParamsTypeAlias => "add_page_params_type_alias",
        }
    }

    fn apply(self, session: &mut RewriteSession) -> ModOutcome<Task> {
        match self {
            Task::FindFunctionDeclarations => {
                let targets = data_function_declarations(session.module());
                ModOutcome::then(targets.into_iter().flat_map(on_data_function).collect())
            }
            Task::FindArrowFunctionExpressions => {
                let targets = data_function_arrows(session.module());
                ModOutcome::then(targets.into_iter().flat_map(on_data_function).collect())
            }
            Task::FindReturnStatements(target) => find_return_statements(session, target),
            Task::FindFallbackObjectProperty(target) => {
                let tasks = property_values(&returns_of(session, target), "fallback")
                    .iter()
                    .filter_map(Fallback::from_expr)
                    .map(Task::AddDynamicParamsExport)
                    .collect();
                ModOutcome::then(tasks)
            }
            Task::FindRevalidateObjectProperty(target) => {
                let tasks = property_values(&returns_of(session, target), "revalidate")
                    .iter()
                    .filter_map(revalidate_seconds)
                    .map(Task::AddRevalidateExport)
                    .collect();
                ModOutcome::then(tasks)
            }
            Task::FindComponentFunctionDefinition => match page_component(session.module()) {
                Some(handle) => ModOutcome::then(vec![Task::AddGetDataVariableDeclaration(handle)]),
                None => {
                    tracing::debug!("no page component behind the default export");
                    ModOutcome::unchanged()
                }
            },
            Task::AddGenerateStaticParams => add_generate_static_params(session),
            Task::AddDynamicExport => add_exported_const(session, "dynamic", str_lit("force-static")),
            Task::AddDynamicParamsExport(fallback) => {
                add_exported_const(session, "dynamicParams", bool_lit(fallback.dynamic_params()))
            }
            Task::AddRevalidateExport(seconds) => add_exported_const(session, "revalidate", num_lit(seconds)),
            Task::AddGetDataInline(target) => add_get_data_inline(session, target),
            Task::AddGetDataWrapper(target) => add_get_data_wrapper(session, target),
            Task::AddGetDataVariableDeclaration(handle) => add_get_data_variable_declaration(session, handle),
            Task::AddImport(request) => add_import(session, request),
            Task::AddPageParamsTypeAlias => add_page_params_type_alias(session),
        }
    }
}

// -----------------------------------------------------------------------------
// Matching
// -----------------------------------------------------------------------------

fn on_data_function(target: FunctionTarget) -> Vec<Task> {
    let mut tasks = vec![Task::FindReturnStatements(target)];
    match target.kind {
        DataFunction::GetStaticPaths => tasks.push(Task::AddGenerateStaticParams),
        DataFunction::GetStaticProps => {
            tasks.extend([Task::FindComponentFunctionDefinition, Task::AddDynamicExport])
        }
        DataFunction::GetServerSideProps => tasks.push(Task::FindComponentFunctionDefinition),
    }
    tasks
}

fn returns_of(session: &mut RewriteSession, target: FunctionTarget) -> Vec<Option<Box<Expr>>> {
    session
        .with_function(target.handle, return_arguments)
        .unwrap_or_default()
}

fn find_return_statements(session: &mut RewriteSession, target: FunctionTarget) -> ModOutcome<Task> {
    let Some(args) = session.with_function(target.handle, return_arguments) else {
        return ModOutcome::unchanged();
    };

    if target.kind == DataFunction::GetStaticPaths {
        return ModOutcome::then(vec![Task::FindFallbackObjectProperty(target)]);
    }

    let mut tasks = vec![];
    if target.kind == DataFunction::GetStaticProps {
        tasks.push(Task::FindRevalidateObjectProperty(target));
    }

    if is_inlineable(&args) {
        tasks.push(Task::AddGetDataInline(target));
    } else {
        tracing::debug!(
            function = target.kind.name(),
            shape = ?target.shape,
            "returns are not all spread-free object literals, wrapping instead of inlining"
        );
        tasks.push(Task::AddGetDataWrapper(target));
    }

    ModOutcome::then(tasks)
}

// -----------------------------------------------------------------------------
// Route segment exports
// -----------------------------------------------------------------------------

fn add_generate_static_params(session: &mut RewriteSession) -> ModOutcome<Task> {
    if declares_top_level(session.body(), GENERATE_STATIC_PARAMS) {
        tracing::debug!("generateStaticParams already declared");
        return ModOutcome::unchanged();
    }
    let Some(function) = generate_static_params_function() else {
        return ModOutcome::unchanged();
    };

    let index = first_index_after_named_declaration(
        session.body(),
        DataFunction::GetStaticPaths.name(),
    );
    session.insert_item(index, function);

    ModOutcome::changed()
}

/// `export const name = value;` at the end of the module, unless the module
/// already exports `name`.
fn add_exported_const(session: &mut RewriteSession, name: &str, value: Expr) -> ModOutcome<Task> {
    if has_exported_variable(session.body(), name) {
        tracing::debug!(name, "export already present");
        return ModOutcome::unchanged();
    }

    session.push_item(exported_const(name, value));
    ModOutcome::changed()
}

// -----------------------------------------------------------------------------
// getData
// -----------------------------------------------------------------------------

fn add_get_data_wrapper(session: &mut RewriteSession, target: FunctionTarget) -> ModOutcome<Task> {
    if declares_top_level(session.body(), GET_DATA) {
        tracing::debug!("getData already declared");
        return ModOutcome::unchanged();
    }
    let Some(wrapper) = get_data_wrapper(target.kind) else {
        return ModOutcome::unchanged();
    };

    let index = first_index_after_named_declaration(session.body(), target.kind.name());
    session.insert_item(index, wrapper);

    ModOutcome::changed().and_then(vec![
        Task::AddImport(ImportRequest::new(&["notFound", "redirect"], NEXT_NAVIGATION)),
        Task::AddImport(ImportRequest::new(&[target.kind.context_type_name()], NEXT)),
        Task::AddPageParamsTypeAlias,
    ])
}

/// Parameters and block body of a data function, detached from the tree.
fn detached_parts(function: FunctionMut<'_>) -> (Vec<Param>, BlockStmt) {
    let (params, body) = match function {
        FunctionMut::Function(function) => (
            function.params.clone(),
            function.body.clone().unwrap_or_else(empty_block),
        ),
        FunctionMut::Arrow(arrow) => {
            let params = arrow.params.iter().cloned().map(param).collect();
            let body = match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => block.clone(),
                BlockStmtOrExpr::Expr(expr) => block_returning(expr.clone()),
            };
            (params, body)
        }
    };

    // fresh identity: no handle can ever resolve into the copy
    (drop_span(params), drop_span(body))
}

fn empty_block() -> BlockStmt {
    BlockStmt {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        stmts: vec![],
    }
}

fn block_returning(arg: Box<Expr>) -> BlockStmt {
    BlockStmt {
        stmts: vec![Stmt::Return(ReturnStmt {
            span: DUMMY_SP,
            arg: Some(arg),
        })],
        ..empty_block()
    }
}

fn annotate_untyped(params: &mut [Param], type_name: &str) {
    for param in params {
        match &mut param.pat {
            Pat::Ident(binding) if binding.type_ann.is_none() => {
                binding.type_ann = Some(type_ref_annotation(type_name));
            }
            Pat::Object(object) if object.type_ann.is_none() => {
                object.type_ann = Some(type_ref_annotation(type_name));
            }
            _ => {}
        }
    }
}

fn add_get_data_inline(session: &mut RewriteSession, target: FunctionTarget) -> ModOutcome<Task> {
    if declares_top_level(session.body(), GET_DATA) {
        tracing::debug!("getData already declared");
        return ModOutcome::unchanged();
    }
    let Some((mut params, mut body)) = session.with_function(target.handle, detached_parts) else {
        return ModOutcome::unchanged();
    };

    let mut rewriter = ReturnRewriter::default();
    body.visit_mut_children_with(&mut rewriter);

    if params.is_empty() {
        params.push(param(binding("props")));
    }
    let context_type = target.kind.context_type_name();
    annotate_untyped(&mut params, context_type);

    let index = first_index_after_named_declaration(session.body(), target.kind.name());
    session.insert_item(index, get_data_function(params, body));

    let mut navigation = vec![];
    if rewriter.used_not_found {
        navigation.push("notFound");
    }
    if rewriter.used_redirect {
        navigation.push("redirect");
    }

    let mut tasks = vec![];
    if !navigation.is_empty() {
        tasks.push(Task::AddImport(ImportRequest::new(&navigation, NEXT_NAVIGATION)));
    }
    tasks.push(Task::AddImport(ImportRequest::new(&[context_type], NEXT)));
    tasks.push(Task::AddPageParamsTypeAlias);

    ModOutcome::changed().and_then(tasks)
}

// -----------------------------------------------------------------------------
// Page component
// -----------------------------------------------------------------------------

/// Feeds the component from `getData`. Returns whether it was rewritten.
fn feed_component(function: FunctionMut<'_>) -> bool {
    let first_param = match &function {
        FunctionMut::Function(function) => function.params.first().map(|param| &param.pat),
        FunctionMut::Arrow(arrow) => arrow.params.first(),
    };
    if first_param.is_some_and(is_page_props_pattern) {
        tracing::debug!("page component already receives page props");
        return false;
    }
    let first_param = first_param.cloned();

    let prologue = [legacy_ctx_declaration(), get_data_binding(first_param.as_ref())];

    match function {
        FunctionMut::Function(function) => {
            let Some(body) = &mut function.body else {
                return false;
            };
            body.stmts.splice(0..0, prologue);
            function.is_async = true;
            function.params = vec![param(page_props_pattern())];
        }
        FunctionMut::Arrow(arrow) => {
            let implicit_return = match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(_) => None,
                BlockStmtOrExpr::Expr(expr) => match unwrap_parens(expr) {
                    jsx @ (Expr::JSXElement(_) | Expr::JSXFragment(_)) => Some(block_returning(Box::new(jsx.clone()))),
                    _ => return false,
                },
            };
            if let Some(block) = implicit_return {
                arrow.body = Box::new(BlockStmtOrExpr::BlockStmt(block));
            }
            let BlockStmtOrExpr::BlockStmt(body) = &mut *arrow.body else {
                return false;
            };
            body.stmts.splice(0..0, prologue);
            arrow.is_async = true;
            arrow.params = vec![page_props_pattern()];
        }
    }

    true
}

fn add_get_data_variable_declaration(
    session: &mut RewriteSession,
    handle: FunctionHandle,
) -> ModOutcome<Task> {
    if !session.with_function(handle, feed_component).unwrap_or(false) {
        return ModOutcome::unchanged();
    }

    let helper = session.options().build_legacy_ctx_util_absolute_path.clone();
    ModOutcome::changed().and_then(vec![
        Task::AddImport(ImportRequest::new(&["headers", "cookies"], NEXT_HEADERS)),
        Task::AddImport(ImportRequest::new(&["buildLegacyCtx"], helper)),
    ])
}

// -----------------------------------------------------------------------------
// Imports and types
// -----------------------------------------------------------------------------

fn imported_names<'a>(body: &'a [ModuleItem], source: &'a str) -> impl Iterator<Item = &'a str> {
    body.iter()
        .filter_map(move |item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) if &*import.src.value == source => {
                Some(import)
            }
            _ => None,
        })
        .flat_map(|import| import.specifiers.iter())
        .filter_map(|specifier| match specifier {
            ImportSpecifier::Named(named) => Some(match &named.imported {
                Some(ModuleExportName::Ident(imported)) => imported.sym.as_ref(),
                _ => named.local.sym.as_ref(),
            }),
            _ => None,
        })
}

fn add_import(session: &mut RewriteSession, request: ImportRequest) -> ModOutcome<Task> {
    let missing: Vec<&str> = request
        .specifiers
        .iter()
        .map(String::as_str)
        .filter(|name| !imported_names(session.body(), &request.source).any(|imported| imported == *name))
        .collect();

    if missing.is_empty() {
        tracing::debug!(source = %request.source, "imports already present");
        return ModOutcome::unchanged();
    }

    let import = import_declaration(&missing, &request.source);
    session.insert_item(0, import);
    ModOutcome::changed()
}

fn add_page_params_type_alias(session: &mut RewriteSession) -> ModOutcome<Task> {
    if declares_top_level(session.body(), PAGE_PROPS) {
        tracing::debug!("page props type already declared");
        return ModOutcome::unchanged();
    }

    let index = first_index_after_imports(session.body());
    session.insert_items(index, page_params_type_aliases());
    ModOutcome::changed()
}
