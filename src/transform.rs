use crate::error::Result;
use crate::options::TransformOptions;
use crate::reorder::component_after_get_data;
use crate::scheduler::drain;
use crate::session::RewriteSession;
use crate::tasks::Task;

/// Migrates one page's data fetching functions to the app router calling
/// convention.
///
/// Returns `Ok(None)` when the page has nothing (left) to migrate, and the
/// full rewritten text otherwise. Text that does not parse as TSX is an
/// error.
pub fn transform(source: &str, options: &TransformOptions) -> Result<Option<String>> {
    transform_file("page.tsx", source, options)
}

/// [`transform`] with the file name used in parse errors.
pub fn transform_file(file: &str, source: &str, options: &TransformOptions) -> Result<Option<String>> {
    let mut session = RewriteSession::parse(file, source, options.clone())?;

    let dirty = drain(
        vec![Task::FindFunctionDeclarations, Task::FindArrowFunctionExpressions],
        &mut session,
    );
    if !dirty {
        tracing::debug!(file, "nothing to migrate");
        return Ok(None);
    }

    match component_after_get_data(session.body()) {
        Some(body) => session.replace_body(body),
        None => tracing::debug!(file, "default export left in place"),
    }

    Ok(Some(session.print()))
}
