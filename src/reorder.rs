use swc_core::ecma::ast::*;

use crate::names::GET_DATA;
use crate::session::{first_declarator_name, first_index_after_named_declaration};

fn is_default_export(item: &ModuleItem) -> bool {
    matches!(
        item,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_))
    )
}

/// `Name` in `export default Name;`
fn default_export_name(item: &ModuleItem) -> Option<&str> {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(ExportDefaultExpr { expr, .. })) => match &**expr {
            Expr::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

/// `function name` or `export const name = ...`
fn declares_component(item: &ModuleItem, name: &str) -> bool {
    match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Fn(fn_decl))) => fn_decl.ident.sym.as_ref() == name,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Var(var), ..
        })) => first_declarator_name(var) == Some(name),
        _ => false,
    }
}

/// Top-level statements with the page component's declaration moved right
/// behind `getData` and the default export right behind the component (or
/// behind `getData` when it exports something without a name).
///
/// Returns `None` when there is no default export or when either statement
/// has nowhere to go; the caller then keeps the original order.
pub(crate) fn component_after_get_data(body: &[ModuleItem]) -> Option<Vec<ModuleItem>> {
    let mut body = body.to_vec();

    let index = body.iter().position(is_default_export)?;
    let default_export = body.remove(index);
    let name = default_export_name(&default_export).map(str::to_string);

    if let Some(name) = &name {
        if let Some(index) = body.iter().position(|item| declares_component(item, name)) {
            let component = body.remove(index);

            let index = first_index_after_named_declaration(&body, GET_DATA);
            if index == 0 {
                return None;
            }
            body.insert(index, component);
        }
    }

    let index = first_index_after_named_declaration(&body, name.as_deref().unwrap_or(GET_DATA));
    if index == 0 {
        return None;
    }
    body.insert(index, default_export);

    Some(body)
}
