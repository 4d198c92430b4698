use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::ast::*,
};

use crate::names::{DataFunction, GET_DATA, PAGE_PROPS};
use crate::session::parse_template;

// -----------------------------------------------------------------------------
// Small builders
// -----------------------------------------------------------------------------

pub(crate) fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

fn ident_expr(name: &str) -> Box<Expr> {
    Box::new(Expr::Ident(ident(name)))
}

pub(crate) fn binding(name: &str) -> Pat {
    Pat::Ident(BindingIdent {
        id: ident(name),
        type_ann: None,
    })
}

pub(crate) fn call(callee: &str, args: Vec<Box<Expr>>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(ident_expr(callee)),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread { spread: None, expr })
            .collect(),
        type_args: None,
    })
}

/// `: Name`
pub(crate) fn type_ref_annotation(name: &str) -> Box<TsTypeAnn> {
    Box::new(TsTypeAnn {
        span: DUMMY_SP,
        type_ann: Box::new(TsType::TsTypeRef(TsTypeRef {
            span: DUMMY_SP,
            type_name: TsEntityName::Ident(ident(name)),
            type_params: None,
        })),
    })
}

pub(crate) fn param(pat: Pat) -> Param {
    Param {
        span: DUMMY_SP,
        decorators: vec![],
        pat,
    }
}

fn const_declaration(name: Pat, init: Expr) -> VarDecl {
    VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: VarDeclKind::Const,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name,
            init: Some(Box::new(init)),
            definite: false,
        }],
    }
}

pub(crate) fn str_lit(value: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}

pub(crate) fn bool_lit(value: bool) -> Expr {
    Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    }))
}

pub(crate) fn num_lit(value: i64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value: value as f64,
        raw: None,
    }))
}

// -----------------------------------------------------------------------------
// Top-level declarations
// -----------------------------------------------------------------------------

/// `export const name = init;`
pub(crate) fn exported_const(name: &str, init: Expr) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
        span: DUMMY_SP,
        decl: Decl::Var(Box::new(const_declaration(binding(name), init))),
    }))
}

/// `import { a, b } from "source";`
pub(crate) fn import_declaration(specifiers: &[&str], source: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: specifiers
            .iter()
            .map(|name| {
                ImportSpecifier::Named(ImportNamedSpecifier {
                    span: DUMMY_SP,
                    local: ident(name),
                    imported: None,
                    is_type_only: false,
                })
            })
            .collect(),
        src: Box::new(Str {
            span: DUMMY_SP,
            value: source.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// `export async function generateStaticParams() { ... }`, listing the
/// paths the legacy `getStaticPaths` produces.
pub(crate) fn generate_static_params_function() -> Option<ModuleItem> {
    parse_template(
        r#"
export async function generateStaticParams() {
    return (await getStaticPaths({})).paths;
}
"#,
    )
    .into_iter()
    .next()
}

/// `async function getData(ctx) { ... }` delegating to the legacy function
/// and translating its result object at runtime.
pub(crate) fn get_data_wrapper(data_function: DataFunction) -> Option<ModuleItem> {
    let template = format!(
        r#"
async function {get_data}(ctx: {context_type}) {{
    const result = await {legacy}(ctx);

    if ("redirect" in result) {{
        redirect(result.redirect.destination);
    }}

    if ("notFound" in result) {{
        notFound();
    }}

    return "props" in result ? result.props : {{}};
}}
"#,
        get_data = GET_DATA,
        context_type = data_function.context_type_name(),
        legacy = data_function.name(),
    );

    parse_template(&template).into_iter().next()
}

/// `async function getData(params) body`
pub(crate) fn get_data_function(params: Vec<Param>, body: BlockStmt) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Decl(Decl::Fn(FnDecl {
        ident: ident(GET_DATA),
        declare: false,
        function: Box::new(Function {
            params,
            decorators: vec![],
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            body: Some(body),
            is_generator: false,
            is_async: true,
            type_params: None,
            return_type: None,
        }),
    })))
}

/// `type Params = ...; type PageProps = ...;`
pub(crate) fn page_params_type_aliases() -> Vec<ModuleItem> {
    parse_template(
        r#"
type Params = {
    [key: string]: string | string[] | undefined;
};

type PageProps = {
    params: Params;
    searchParams: Params;
};
"#,
    )
}

// -----------------------------------------------------------------------------
// Page component pieces
// -----------------------------------------------------------------------------

const PAGE_PARAMS: &str = "pageParams";
const PAGE_SEARCH_PARAMS: &str = "pageSearchParams";
const LEGACY_CTX: &str = "legacyCtx";

fn renaming_prop(key: &str, local: &str) -> ObjectPatProp {
    ObjectPatProp::KeyValue(KeyValuePatProp {
        key: PropName::Ident(IdentName::new(key.into(), DUMMY_SP)),
        value: Box::new(binding(local)),
    })
}

/// `{ params: pageParams, searchParams: pageSearchParams }: PageProps`
///
/// The locals are renamed so they cannot clash with the page's own bindings.
pub(crate) fn page_props_pattern() -> Pat {
    Pat::Object(ObjectPat {
        span: DUMMY_SP,
        props: vec![
            renaming_prop("params", PAGE_PARAMS),
            renaming_prop("searchParams", PAGE_SEARCH_PARAMS),
        ],
        optional: false,
        type_ann: Some(type_ref_annotation(PAGE_PROPS)),
    })
}

pub(crate) fn is_page_props_pattern(pat: &Pat) -> bool {
    let Pat::Object(object) = pat else {
        return false;
    };
    object.props.iter().any(|prop| match prop {
        ObjectPatProp::KeyValue(kv) => {
            matches!(&kv.key, PropName::Ident(key) if key.sym.as_ref() == "params")
                && matches!(&*kv.value, Pat::Ident(local) if local.id.sym.as_ref() == PAGE_PARAMS)
        }
        _ => false,
    })
}

/// `const legacyCtx = buildLegacyCtx(headers(), cookies(), pageParams, pageSearchParams);`
pub(crate) fn legacy_ctx_declaration() -> Stmt {
    let init = call(
        "buildLegacyCtx",
        vec![
            Box::new(call("headers", vec![])),
            Box::new(call("cookies", vec![])),
            ident_expr(PAGE_PARAMS),
            ident_expr(PAGE_SEARCH_PARAMS),
        ],
    );

    Stmt::Decl(Decl::Var(Box::new(const_declaration(binding(LEGACY_CTX), init))))
}

/// `const <first param> = await getData(legacyCtx);`, or the bare awaited
/// call when the component took no usable parameter.
pub(crate) fn get_data_binding(first_param: Option<&Pat>) -> Stmt {
    let awaited = Expr::Await(AwaitExpr {
        span: DUMMY_SP,
        arg: Box::new(call(GET_DATA, vec![ident_expr(LEGACY_CTX)])),
    });

    let name = match first_param {
        Some(Pat::Ident(param)) => Some(binding(&param.id.sym)),
        Some(Pat::Object(object)) => Some(Pat::Object(ObjectPat {
            type_ann: None,
            ..object.clone()
        })),
        _ => None,
    };

    match name {
        Some(name) => Stmt::Decl(Decl::Var(Box::new(const_declaration(name, awaited)))),
        None => Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(awaited),
        }),
    }
}
