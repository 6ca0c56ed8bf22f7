//! Dynamic dispatch from an adapter kind and untyped arguments to a typed adapter.

use super::custom::CustomMakeAdapter;
use super::dotnet::DotnetAdapter;
use super::go::GoAdapter;
use super::java::JavaAdapter;
use super::nodejs::NodejsAdapter;
use super::python::PythonAdapter;
use super::ruby::RubyAdapter;
use super::rust::RustAdapter;
use super::{construct, AdapterKind, BuildAdapter, BuildContext, Constructed};
use crate::error::{ConstructError, Stage};
use crate::validation::InputErrors;
use serde::Serialize;
use serde_json::Value;

/// Decodes `args` for `kind` and runs the adapter. Missing and unknown keys are all
/// reported at once; a value of the wrong type is reported on its own.
pub fn construct_value(
    kind: AdapterKind,
    name: &str,
    args: Value,
    ctx: &BuildContext,
) -> Result<Constructed, ConstructError> {
    match kind {
        AdapterKind::Custom => decode_and_construct(&CustomMakeAdapter, name, args, ctx),
        AdapterKind::Dotnet => decode_and_construct(&DotnetAdapter, name, args, ctx),
        AdapterKind::Go => decode_and_construct(&GoAdapter, name, args, ctx),
        AdapterKind::Java => decode_and_construct(&JavaAdapter, name, args, ctx),
        AdapterKind::Nodejs => decode_and_construct(&NodejsAdapter, name, args, ctx),
        AdapterKind::Python => decode_and_construct(&PythonAdapter, name, args, ctx),
        AdapterKind::Ruby => decode_and_construct(&RubyAdapter, name, args, ctx),
        AdapterKind::Rust => decode_and_construct(&RustAdapter, name, args, ctx),
    }
}

fn decode_and_construct<A: BuildAdapter>(
    adapter: &A,
    name: &str,
    args: Value,
    ctx: &BuildContext,
) -> Result<Constructed, ConstructError> {
    if let Value::Object(map) = &args {
        let errors = InputErrors::from_shape(map, A::FIELDS);
        if !errors.is_empty() {
            return Err(ConstructError::invalid(Stage::Validating, errors));
        }
    }
    let args: A::Args = serde_json::from_value(args).map_err(|e| {
        ConstructError::invalid(Stage::Validating, InputErrors::from_decode_error(&e))
    })?;
    construct(adapter, name, &args, ctx)
}

/// Static description of an adapter for listings.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterInfo {
    pub kind: AdapterKind,
    pub name: &'static str,
    pub type_token: &'static str,
    pub workflows: Vec<String>,
    pub runtimes: Vec<&'static str>,
}

pub fn describe(kind: AdapterKind) -> AdapterInfo {
    match kind {
        AdapterKind::Custom => info_of(&CustomMakeAdapter),
        AdapterKind::Dotnet => info_of(&DotnetAdapter),
        AdapterKind::Go => info_of(&GoAdapter),
        AdapterKind::Java => info_of(&JavaAdapter),
        AdapterKind::Nodejs => info_of(&NodejsAdapter),
        AdapterKind::Python => info_of(&PythonAdapter),
        AdapterKind::Ruby => info_of(&RubyAdapter),
        AdapterKind::Rust => info_of(&RustAdapter),
    }
}

fn info_of<A: BuildAdapter>(adapter: &A) -> AdapterInfo {
    let kind = adapter.kind();
    AdapterInfo {
        kind,
        name: kind.name(),
        type_token: kind.type_token(),
        workflows: adapter.workflows().iter().map(ToString::to_string).collect(),
        runtimes: adapter.runtimes(),
    }
}
