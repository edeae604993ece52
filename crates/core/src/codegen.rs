//! Code generation from bindings to TypeScript modules.
//!
//! Each `render_*` function lowers its inputs into a [`TsModule`] and emits
//! it. Every function here is pure, so route files can be rendered in
//! parallel.

use std::collections::{BTreeMap, BTreeSet};

use crate::binder::AccessorPath;
use crate::binding::{
    BindingSpec, InputShape, MUTATION_PASSTHROUGH_KEYS, MutationBinding, QueryBinding,
};
use crate::ir::Emit;
use crate::ir::types::{
    BinOp, ObjectEntry, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use crate::ir::utils::string_record;
use crate::model::HttpMethod;
use crate::target::{FactoryStyle, OutputLayout, TargetProfile};
use crate::typemap::RouteTypes;

/// Banner placed at the top of every generated file.
pub const BANNER: &str = "This file was generated by hookgen. Do not edit it by hand.";

/// Module names relative to the output root.
pub const TYPES_MODULE: &str = "types";
pub const CLIENT_MODULE: &str = "client";
pub const HOOKS_DIR: &str = "hooks";

const CLIENT_OPTIONS_TYPE: &str = "ClientRequestOptions";
const API_CLIENT_TYPE: &str = "ApiClient";
const ERROR_TYPE: &str = "Error";

fn header(profile: &TargetProfile) -> Option<String> {
    profile.banner.then(|| BANNER.to_string())
}

/// Import specifier of a sibling module from a file `depth` levels deep.
fn local_module(name: &str, depth: usize) -> String {
    if depth == 0 {
        format!("./{name}")
    } else {
        format!("{}{name}", "../".repeat(depth))
    }
}

fn string_literal(value: &str) -> TsType {
    TsType::Literal(TsLiteral::String(value.to_string()))
}

fn doc_lines(label: &str, summary: Option<&str>, deprecated: bool) -> Vec<String> {
    let mut docs = vec![format!("`{label}`")];
    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        docs.push(String::new());
        docs.push(summary.to_string());
    }
    if deprecated {
        docs.push("@deprecated".to_string());
    }
    docs
}

// =============================================================================
// types.ts
// =============================================================================

/// Component schema types followed by per-route argument and response types.
pub fn render_types(
    components: &[TsTypeDef],
    routes: &[RouteTypes],
    profile: &TargetProfile,
) -> String {
    let mut types = components.to_vec();
    for route in routes {
        types.extend(route.args.iter().cloned());
        types.push(route.response.clone());
    }
    TsModule {
        header: header(profile),
        types,
        ..TsModule::default()
    }
    .emit()
}

// =============================================================================
// client.ts
// =============================================================================

/// One level of the nested client interface.
#[derive(Debug, Default)]
struct ClientNode {
    verbs: BTreeMap<HttpMethod, TsType>,
    children: BTreeMap<String, ClientNode>,
}

impl ClientNode {
    fn insert(&mut self, accessor: &AccessorPath, callable: TsType) {
        let node = accessor
            .keys()
            .iter()
            .fold(self, |node, key| node.children.entry(key.clone()).or_default());
        node.verbs.insert(accessor.method(), callable);
    }

    fn properties(&self) -> Vec<TsProp> {
        let verbs = self
            .verbs
            .iter()
            .map(|(method, callable)| TsProp::new(method.verb(), callable.clone(), false));
        let children = self
            .children
            .iter()
            .map(|(key, child)| TsProp::new(key, TsType::Object(child.properties()), false));
        verbs.chain(children).collect()
    }
}

fn args_param(input: &InputShape) -> TsParam {
    match input {
        InputShape::Args(name) => TsParam::new("args", TsType::Ref(name.clone())),
        InputShape::None => TsParam::optional("args", TsType::Primitive(TsPrimitive::Undefined)),
    }
}

/// `(args: XArgs, options?: ClientRequestOptions) => Promise<XResponse>`
fn callable_type(input: &InputShape, response_type: &str) -> TsType {
    TsType::Function {
        params: vec![
            args_param(input),
            TsParam::optional("options", TsType::Ref(CLIENT_OPTIONS_TYPE.into())),
        ],
        ret: Box::new(TsType::generic(
            "Promise",
            vec![TsType::Ref(response_type.to_string())],
        )),
    }
}

fn client_options_def() -> TsTypeDef {
    TsTypeDef {
        name: CLIENT_OPTIONS_TYPE.into(),
        kind: TypeDefKind::Interface {
            properties: vec![
                TsProp::new(
                    "headers",
                    string_record(TsType::Primitive(TsPrimitive::String)),
                    true,
                )
                .with_doc(Some("Extra request headers.".into())),
                TsProp::new("signal", TsType::Ref("AbortSignal".into()), true)
                    .with_doc(Some("Aborts the request when signalled.".into())),
                TsProp::new("init", TsType::Ref("RequestInit".into()), true)
                    .with_doc(Some("Passed through to `fetch`.".into())),
            ],
        },
        docs: vec!["Per-request options accepted by every client callable.".into()],
    }
}

/// `ClientRequestOptions` and the nested `ApiClient` interface.
pub fn render_client(bindings: &[BindingSpec], profile: &TargetProfile) -> String {
    let mut root = ClientNode::default();
    let mut type_imports = BTreeSet::new();

    for binding in bindings {
        let (accessor, input, response_type) = match binding {
            BindingSpec::Query(q) => (&q.accessor, &q.input, &q.response_type),
            BindingSpec::Mutation(m) => (&m.accessor, &m.input, &m.response_type),
        };
        root.insert(accessor, callable_type(input, response_type));
        type_imports.extend(input.args_type().map(str::to_string));
        type_imports.insert(response_type.clone());
    }

    let imports = if type_imports.is_empty() {
        vec![]
    } else {
        vec![TsImport {
            items: type_imports.into_iter().collect(),
            from: local_module(TYPES_MODULE, 0),
            type_only: true,
        }]
    };

    TsModule {
        header: header(profile),
        imports,
        types: vec![
            client_options_def(),
            TsTypeDef {
                name: API_CLIENT_TYPE.into(),
                kind: TypeDefKind::Interface {
                    properties: root.properties(),
                },
                docs: vec![
                    "Shape of the path-chained client: one property per path segment, one `$<method>` callable per route.".into(),
                ],
            },
        ],
        ..TsModule::default()
    }
    .emit()
}

// =============================================================================
// Hooks
// =============================================================================

/// Runtime and type imports a set of bindings needs from the query package.
#[derive(Debug, Default)]
struct RuntimeImports {
    values: BTreeSet<&'static str>,
    types: BTreeSet<&'static str>,
}

impl RuntimeImports {
    fn add(&mut self, binding: &BindingSpec) {
        match binding {
            BindingSpec::Query(_) => {
                self.values.extend(["queryOptions", "useQuery"]);
                self.types.insert("UseQueryOptions");
            }
            BindingSpec::Mutation(_) => {
                self.values.insert("useMutation");
                self.types.insert("UseMutationOptions");
            }
        }
    }
}

fn hook_imports(
    bindings: &[&BindingSpec],
    profile: &TargetProfile,
    depth: usize,
) -> Vec<TsImport> {
    let mut runtime = RuntimeImports::default();
    let mut local_types = BTreeSet::new();
    for binding in bindings {
        runtime.add(binding);
        let (input, response_type) = match binding {
            BindingSpec::Query(q) => (&q.input, &q.response_type),
            BindingSpec::Mutation(m) => (&m.input, &m.response_type),
        };
        local_types.extend(input.args_type().map(str::to_string));
        local_types.insert(response_type.clone());
    }

    let package = profile.package();
    vec![
        TsImport {
            items: runtime.values.iter().map(|s| (*s).to_string()).collect(),
            from: package.into(),
            type_only: false,
        },
        TsImport {
            items: runtime.types.iter().map(|s| (*s).to_string()).collect(),
            from: package.into(),
            type_only: true,
        },
        TsImport {
            items: vec![profile.client_export.clone()],
            from: profile.client_import_from(depth),
            type_only: false,
        },
        TsImport {
            items: vec![CLIENT_OPTIONS_TYPE.into()],
            from: local_module(CLIENT_MODULE, depth),
            type_only: true,
        },
        TsImport {
            items: local_types.into_iter().collect(),
            from: local_module(TYPES_MODULE, depth),
            type_only: true,
        },
    ]
}

fn hook_functions(binding: &BindingSpec, profile: &TargetProfile) -> Vec<TsFunction> {
    match binding {
        BindingSpec::Query(query) => vec![
            query_key_function(query),
            query_options_function(query, profile),
            query_hook(query),
        ],
        BindingSpec::Mutation(mutation) => vec![mutation_hook(mutation, profile)],
    }
}

/// One route's hook file, `depth` directories below the output root.
pub fn render_hook(binding: &BindingSpec, profile: &TargetProfile, depth: usize) -> String {
    TsModule {
        header: header(profile),
        imports: hook_imports(&[binding], profile, depth),
        functions: hook_functions(binding, profile),
        ..TsModule::default()
    }
    .emit()
}

/// Every route's hooks in one file at the output root.
pub fn render_hooks(bindings: &[BindingSpec], profile: &TargetProfile) -> String {
    let refs: Vec<_> = bindings.iter().collect();
    let imports = if refs.is_empty() {
        vec![]
    } else {
        hook_imports(&refs, profile, 0)
    };
    TsModule {
        header: header(profile),
        imports,
        functions: bindings
            .iter()
            .flat_map(|binding| hook_functions(binding, profile))
            .collect(),
        ..TsModule::default()
    }
    .emit()
}

fn args_expr(input: &InputShape) -> TsExpr {
    match input {
        InputShape::Args(_) => TsExpr::ident("args"),
        InputShape::None => TsExpr::ident("undefined"),
    }
}

fn required_args_param(input: &InputShape) -> Option<TsParam> {
    input
        .args_type()
        .map(|name| TsParam::new("args", TsType::Ref(name.to_string())))
}

/// `export function getXQueryKey(args: XArgs) { return ["/x", args] as const; }`
fn query_key_function(query: &QueryBinding) -> TsFunction {
    let mut elements = vec![TsExpr::string(&query.cache_namespace)];
    if query.input.args_type().is_some() {
        elements.push(TsExpr::ident("args"));
    }
    TsFunction {
        name: query.cache_key_fn.clone(),
        params: required_args_param(&query.input).into_iter().collect(),
        return_type: None,
        body: vec![TsStmt::Return(TsExpr::Cast {
            expr: Box::new(TsExpr::Array(elements)),
            ty: TsType::Ref("const".into()),
        })],
        is_export: true,
        is_arrow: false,
        docs: vec![],
    }
}

/// `queryOptions({ queryKey, queryFn })` composed from the key function and the client call.
fn query_options_function(query: &QueryBinding, profile: &TargetProfile) -> TsFunction {
    let key_args: Vec<_> = query
        .input
        .args_type()
        .map(|_| TsExpr::ident("args"))
        .into_iter()
        .collect();

    let (fetch_params, request_options) = if query.supports_cancellation {
        (
            vec![TsParam::untyped("{ signal }")],
            TsExpr::Object(vec![
                ObjectEntry::Spread(TsExpr::ident("clientOptions")),
                ObjectEntry::Shorthand("signal".into()),
            ]),
        )
    } else {
        (vec![], TsExpr::ident("clientOptions"))
    };

    let fetcher = TsExpr::Arrow {
        params: fetch_params,
        body: Box::new(TsExpr::call(
            query.accessor.expression(&profile.client_export),
            vec![args_expr(&query.input), request_options],
        )),
    };

    let mut params: Vec<_> = required_args_param(&query.input).into_iter().collect();
    params.push(TsParam::optional(
        "clientOptions",
        TsType::Ref(CLIENT_OPTIONS_TYPE.into()),
    ));

    TsFunction {
        name: query.options_fn.clone(),
        params,
        return_type: None,
        body: vec![TsStmt::Return(TsExpr::call(
            TsExpr::ident("queryOptions"),
            vec![TsExpr::Object(vec![
                ObjectEntry::Prop(
                    "queryKey".into(),
                    TsExpr::call(TsExpr::ident(&query.cache_key_fn), key_args),
                ),
                ObjectEntry::Prop("queryFn".into(), fetcher),
            ])],
        ))],
        is_export: true,
        is_arrow: profile.factory_style == FactoryStyle::Const,
        docs: vec![],
    }
}

/// `const { query: queryOverrides, client: clientOptions } = options ?? {};`
fn destructure_options(runtime_key: &str) -> TsStmt {
    TsStmt::Const {
        name: format!("{{ {runtime_key}: {runtime_key}Overrides, client: clientOptions }}"),
        init: TsExpr::BinOp {
            left: Box::new(TsExpr::ident("options")),
            op: BinOp::NullishCoalesce,
            right: Box::new(TsExpr::Object(vec![])),
        },
    }
}

/// `{ <key>?: <ty>; client?: ClientRequestOptions }`
fn hook_options_type(runtime_key: &str, ty: TsType) -> TsType {
    TsType::Object(vec![
        TsProp::new(runtime_key, ty, true),
        TsProp::new("client", TsType::Ref(CLIENT_OPTIONS_TYPE.into()), true),
    ])
}

fn query_hook(query: &QueryBinding) -> TsFunction {
    let overrides = TsType::generic(
        "Omit",
        vec![
            TsType::generic(
                "UseQueryOptions",
                vec![
                    TsType::Ref(query.response_type.clone()),
                    TsType::Ref(ERROR_TYPE.into()),
                ],
            ),
            TsType::Union(vec![string_literal("queryKey"), string_literal("queryFn")]),
        ],
    );

    let mut params: Vec<_> = required_args_param(&query.input).into_iter().collect();
    params.push(TsParam::optional(
        "options",
        hook_options_type("query", overrides),
    ));

    let mut factory_args: Vec<_> = query
        .input
        .args_type()
        .map(|_| TsExpr::ident("args"))
        .into_iter()
        .collect();
    factory_args.push(TsExpr::ident("clientOptions"));

    TsFunction {
        name: query.hook_name.clone(),
        params,
        return_type: None,
        body: vec![
            destructure_options("query"),
            TsStmt::Return(TsExpr::call(
                TsExpr::ident("useQuery"),
                vec![TsExpr::Object(vec![
                    ObjectEntry::Spread(TsExpr::call(
                        TsExpr::ident(&query.options_fn),
                        factory_args,
                    )),
                    ObjectEntry::Spread(TsExpr::ident("queryOverrides")),
                ])],
            )),
        ],
        is_export: true,
        is_arrow: false,
        docs: doc_lines(&query.label, query.summary.as_deref(), query.deprecated),
    }
}

fn mutation_hook(mutation: &MutationBinding, profile: &TargetProfile) -> TsFunction {
    let variables = match mutation.input.args_type() {
        Some(name) => TsType::Ref(name.to_string()),
        None => TsType::Primitive(TsPrimitive::Void),
    };

    let allowed = mutation
        .lifecycle_hooks
        .iter()
        .map(|hook| string_literal(hook.as_str()))
        .chain(MUTATION_PASSTHROUGH_KEYS.iter().map(|key| string_literal(key)))
        .collect();

    let overrides = TsType::generic(
        "Pick",
        vec![
            TsType::generic(
                "UseMutationOptions",
                vec![
                    TsType::Ref(mutation.response_type.clone()),
                    TsType::Ref(ERROR_TYPE.into()),
                    variables,
                ],
            ),
            TsType::Union(allowed),
        ],
    );

    let mutation_fn = TsExpr::Arrow {
        params: required_args_param(&mutation.input).into_iter().collect(),
        body: Box::new(TsExpr::call(
            mutation.accessor.expression(&profile.client_export),
            vec![args_expr(&mutation.input), TsExpr::ident("clientOptions")],
        )),
    };

    TsFunction {
        name: mutation.hook_name.clone(),
        params: vec![TsParam::optional(
            "options",
            hook_options_type("mutation", overrides),
        )],
        return_type: None,
        body: vec![
            destructure_options("mutation"),
            TsStmt::Return(TsExpr::call(
                TsExpr::ident("useMutation"),
                vec![TsExpr::Object(vec![
                    ObjectEntry::Prop("mutationFn".into(), mutation_fn),
                    ObjectEntry::Spread(TsExpr::ident("mutationOverrides")),
                ])],
            )),
        ],
        is_export: true,
        is_arrow: false,
        docs: doc_lines(&mutation.label, mutation.summary.as_deref(), mutation.deprecated),
    }
}

// =============================================================================
// index.ts
// =============================================================================

/// Barrel module re-exporting everything generated.
pub fn render_index(bindings: &[BindingSpec], profile: &TargetProfile) -> String {
    let mut reexports = vec![local_module(TYPES_MODULE, 0), local_module(CLIENT_MODULE, 0)];
    match profile.layout {
        OutputLayout::PerRoute => reexports.extend(
            bindings
                .iter()
                .map(|b| format!("./{HOOKS_DIR}/{}", b.hook_name())),
        ),
        OutputLayout::SingleFile if !bindings.is_empty() => {
            reexports.push(local_module(HOOKS_DIR, 0));
        }
        OutputLayout::SingleFile => {}
    }
    TsModule {
        header: header(profile),
        reexports,
        ..TsModule::default()
    }
    .emit()
}
