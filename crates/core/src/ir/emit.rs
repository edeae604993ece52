//! Printing of the TypeScript AST.
//!
//! Output is deterministic: two-space indentation, `;` after members and
//! statements, double-quoted strings.

use super::types::{
    BinOp, ObjectEntry, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive,
    TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{escape_string, property_key};

/// An AST node that prints as TypeScript source.
pub trait Emit {
    fn emit(&self) -> String;
}

fn pad(level: usize) -> String {
    "  ".repeat(level)
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

/// Parenthesize `ty` when `loose` says it binds too loosely for its position.
fn operand(ty: &TsType, loose: fn(&TsType) -> bool) -> String {
    if loose(ty) {
        format!("({})", ty.emit())
    } else {
        ty.emit()
    }
}

fn optional_mark(optional: bool) -> &'static str {
    if optional { "?" } else { "" }
}

/// JSDoc block at `level`. Blank lines become a bare ` *`.
fn emit_docs(lines: &[String], level: usize) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let indent = pad(level);
    let mut out = format!("{indent}/**\n");
    for line in lines.iter().flat_map(|l| l.split('\n')) {
        let text = line.trim_end().replace("*/", "*\\/");
        if text.trim().is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {text}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
    out
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        let keyword = match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Void => "void",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Unknown => "unknown",
        };
        keyword.to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Array(inner) => {
                let elem = operand(inner, |t| {
                    matches!(
                        t,
                        TsType::Union(_) | TsType::Intersection(_) | TsType::Function { .. }
                    )
                });
                format!("{elem}[]")
            }
            TsType::Union(members) => members
                .iter()
                .map(|t| operand(t, |t| matches!(t, TsType::Function { .. })))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(members) => members
                .iter()
                .map(|t| operand(t, |t| matches!(t, TsType::Union(_) | TsType::Function { .. })))
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) if props.is_empty() => "{}".to_string(),
            TsType::Object(props) => format!("{{ {} }}", join(props, "; ")),
            TsType::Record { key, value } => format!("Record<{}, {}>", key.emit(), value.emit()),
            TsType::Generic { name, args } => format!("{name}<{}>", join(args, ", ")),
            TsType::Function { params, ret } => {
                format!("({}) => {}", join(params, ", "), ret.emit())
            }
        }
    }
}

impl TsType {
    /// Like [`Emit::emit`], but non-empty object types span several lines,
    /// closing at `level`.
    pub fn emit_block(&self, level: usize) -> String {
        let TsType::Object(props) = self else {
            return self.emit();
        };
        if props.is_empty() {
            return self.emit();
        }
        let members: String = props.iter().map(|p| p.emit_member(level + 1)).collect();
        format!("{{\n{members}{}}}", pad(level))
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        format!(
            "{}{}: {}",
            property_key(&self.name),
            optional_mark(self.optional),
            self.ty.emit()
        )
    }
}

impl TsProp {
    /// One member line of an interface or object block, JSDoc included.
    pub fn emit_member(&self, level: usize) -> String {
        let docs: Vec<String> = self.doc.iter().cloned().collect();
        format!(
            "{}{}{}{}: {};\n",
            emit_docs(&docs, level),
            pad(level),
            property_key(&self.name),
            optional_mark(self.optional),
            self.ty.emit_block(level)
        )
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let name = &self.name;
        let body = match &self.kind {
            TypeDefKind::Interface { properties } => {
                let members: String = properties.iter().map(|p| p.emit_member(1)).collect();
                format!("export interface {name} {{\n{members}}}\n")
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("export type {name} = {};\n", ty.emit_block(0))
            }
            TypeDefKind::ConstEnum { values } => {
                let entries: String = values
                    .iter()
                    .map(|(key, value)| format!("  {key}: {},\n", value.emit()))
                    .collect();
                format!(
                    "export const {name} = {{\n{entries}}} as const;\n\n\
                     export type {name} = (typeof {name})[keyof typeof {name}];\n"
                )
            }
        };
        emit_docs(&self.docs, 0) + &body
    }
}

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::NullishCoalesce => "??".to_string(),
        }
    }
}

impl Emit for ObjectEntry {
    fn emit(&self) -> String {
        match self {
            ObjectEntry::Prop(key, value) => format!("{}: {}", property_key(key), value.emit()),
            ObjectEntry::Spread(expr) => format!("...{}", expr.emit()),
            ObjectEntry::Shorthand(name) => name.clone(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            TsExpr::Arrow { params, body } => {
                format!("({}) => {}", join(params, ", "), body.emit())
            }
            TsExpr::Object(entries) if entries.is_empty() => "{}".to_string(),
            TsExpr::Object(entries) => format!("{{ {} }}", join(entries, ", ")),
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::Index { object, index } => format!("{}[{}]", object.emit(), index.emit()),
            TsExpr::Array(items) => format!("[{}]", join(items, ", ")),
            TsExpr::Cast { expr, ty } => format!("{} as {}", expr.emit(), ty.emit()),
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let head = format!("{}{}", self.name, optional_mark(self.optional));
        match &self.ty {
            Some(ty) => format!("{head}: {}", ty.emit()),
            None => head,
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    pub fn emit_indented(&self, level: usize) -> String {
        let code = match self {
            TsStmt::Const { name, init } => format!("const {name} = {}", init.emit()),
            TsStmt::Return(expr) => format!("return {}", expr.emit()),
        };
        format!("{}{code};\n", pad(level))
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let name = &self.name;
        let params = join(&self.params, ", ");
        let ret = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        let body: String = self.body.iter().map(|s| s.emit_indented(1)).collect();

        let code = if self.is_arrow {
            format!("{export}const {name} = ({params}){ret} => {{\n{body}}};\n")
        } else {
            format!("{export}function {name}({params}){ret} {{\n{body}}}\n")
        };
        emit_docs(&self.docs, 0) + &code
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let kind = if self.type_only { "import type" } else { "import" };
        format!("{kind} {{ {} }} from \"{}\";\n", self.items.join(", "), self.from)
    }
}

impl Emit for TsModule {
    /// Sections (banner, imports, re-exports, each type, each function) are
    /// separated by one blank line.
    fn emit(&self) -> String {
        let mut sections: Vec<String> = Vec::new();
        if let Some(header) = &self.header {
            sections.push(header.lines().map(|l| format!("// {l}\n")).collect());
        }
        if !self.imports.is_empty() {
            sections.push(self.imports.iter().map(Emit::emit).collect());
        }
        if !self.reexports.is_empty() {
            sections.push(
                self.reexports
                    .iter()
                    .map(|m| format!("export * from \"{m}\";\n"))
                    .collect(),
            );
        }
        sections.extend(self.types.iter().map(Emit::emit));
        sections.extend(self.functions.iter().map(Emit::emit));
        sections.join("\n")
    }
}
