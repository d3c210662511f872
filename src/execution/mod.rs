//! Query execution engine.
//!
//! Executes a selection tree against a [`Schema`] and a [`DataSource`]:
//! root-field lookup, root resolver, then projection of the resolved value.
//! Nothing is cached; each call re-reads the source.

pub mod path;
pub mod response;

use crate::config::EngineConfig;
use crate::projection::Projector;
use crate::schema::{Schema, TYPENAME_FIELD};
use crate::selection::Query;
use crate::source::DataSource;
use crate::Error;

pub use path::{Path, PathSegment};
pub use response::{ErrorExtensions, ErrorKind, FieldError, Response, ResultMap, ResultValue};

/// Name of the implicit shape that owns the root fields.
pub const QUERY_SHAPE: &str = "Query";

/// Execute `query` against `source`.
///
/// Never fails outright: query-level problems (unknown root field,
/// selection too deep) produce `data: null` and one error, everything else
/// is reported next to whatever data could still be produced.
pub fn execute(schema: &Schema, config: &EngineConfig, query: &Query, source: &dyn DataSource) -> Response {
    let root_name = query.root_name();
    let span = tracing::debug_span!("execute", root = %root_name);
    let _guard = span.enter();

    let depth = query.depth();
    if depth > config.max_depth {
        let error = Error::SelectionTooDeep { depth, limit: config.max_depth };
        tracing::warn!(%error, "query rejected");
        return Response::rejected(FieldError::new(&error, Path::new()));
    }

    if root_name == TYPENAME_FIELD {
        return typename_root(query);
    }

    let root = match schema.root_field(root_name) {
        Ok(root) => root,
        Err(error) => {
            tracing::warn!(%error, "query rejected");
            return Response::rejected(FieldError::new(&error, Path::new()));
        }
    };

    let key = query.root.response_key();
    let mut projector = Projector::new(schema.registry(), config);
    let mut path = Path::new();
    path.push_key(key);
    projector.set_path(path);

    let value = match root.resolve(source) {
        Ok(raw) => projector.project_field(QUERY_SHAPE, &root.name, &root.kind, Some(&raw), &query.root.selection),
        Err(error) => {
            projector.record(Error::ResolverFailed {
                field: root.name.clone(),
                message: error.to_string(),
            });
            ResultValue::Null
        }
    };

    let mut data = ResultMap::with_capacity(1);
    data.insert(key.to_owned(), value);
    let errors = projector.finish();
    tracing::debug!(errors = errors.len(), "query executed");
    Response::new(data, errors)
}

/// `{ __typename }` at the root answers with the query shape itself.
fn typename_root(query: &Query) -> Response {
    let key = query.root.response_key();
    if !query.root.selection.is_leaf() {
        let error = Error::InvalidSelection {
            shape: QUERY_SHAPE.to_owned(),
            field: TYPENAME_FIELD.to_owned(),
            message: "__typename takes no sub-selection".to_owned(),
        };
        let mut path = Path::new();
        path.push_key(key);
        let mut data = ResultMap::with_capacity(1);
        data.insert(key.to_owned(), ResultValue::Null);
        return Response::new(data, vec![FieldError::new(&error, path)]);
    }
    let mut data = ResultMap::with_capacity(1);
    data.insert(key.to_owned(), ResultValue::from(QUERY_SHAPE));
    Response::new(data, Vec::new())
}
