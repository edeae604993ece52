//! A small TypeScript AST.
//!
//! Only the constructs generated modules use are modelled: type
//! expressions, a handful of expression forms, `const`/`return` statements,
//! functions, imports and re-exports.

#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    Union(Vec<TsType>),
    Intersection(Vec<TsType>),
    /// Inline object type, printed on one line unless emitted as a block.
    Object(Vec<TsProp>),
    Record {
        key: Box<TsType>,
        value: Box<TsType>,
    },
    Literal(TsLiteral),
    /// Named type reference: User, Blob
    Ref(String),
    /// Generic application: Promise<User>
    Generic { name: String, args: Vec<TsType> },
    /// Function type: (args: A, options?: B) => R
    Function {
        params: Vec<TsParam>,
        ret: Box<TsType>,
    },
}

impl TsType {
    /// Shorthand for `unknown`, the opaque type marker.
    pub fn unknown() -> Self {
        TsType::Primitive(TsPrimitive::Unknown)
    }

    /// Shorthand for a generic application.
    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Generic {
            name: name.into(),
            args,
        }
    }

    /// Check if this type is the opaque `unknown` marker.
    pub fn is_unknown(&self) -> bool {
        matches!(self, TsType::Primitive(TsPrimitive::Unknown))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Void,
    Undefined,
    Unknown,
}

/// Interface member or object-type property.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    /// Rendered as a JSDoc comment when the object is emitted as a block.
    pub doc: Option<String>,
}

impl TsProp {
    pub fn new(name: impl Into<String>, ty: TsType, optional: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            optional,
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone)]
pub enum TsExpr {
    Ident(String),
    Literal(TsLiteral),
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Arrow function with an expression body: (x) => x.foo
    Arrow {
        params: Vec<TsParam>,
        body: Box<TsExpr>,
    },
    /// Object literal: { a: 1, ...rest, b }
    Object(Vec<ObjectEntry>),
    /// `object.prop`
    Member { object: Box<TsExpr>, prop: String },
    /// `object[index]`
    Index {
        object: Box<TsExpr>,
        index: Box<TsExpr>,
    },
    Array(Vec<TsExpr>),
    /// `expr as ty`; `as const` uses `TsType::Ref("const")`.
    Cast { expr: Box<TsExpr>, ty: TsType },
    /// Binary operation: a ?? b
    BinOp {
        left: Box<TsExpr>,
        op: BinOp,
        right: Box<TsExpr>,
    },
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn call(callee: TsExpr, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    pub fn index(self, index: TsExpr) -> Self {
        TsExpr::Index {
            object: Box::new(self),
            index: Box::new(index),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ObjectEntry {
    /// key: value
    Prop(String, TsExpr),
    /// ...expr
    Spread(TsExpr),
    /// Shorthand property: { signal }
    Shorthand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    NullishCoalesce,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Name or destructuring pattern, e.g. `{ signal }`.
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
}

impl TsParam {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: true,
        }
    }

    /// Untyped parameter (the type is inferred from context).
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            optional: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TsImport {
    pub items: Vec<String>,
    pub from: String,
    /// `import type { .. }`
    pub type_only: bool,
}

#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface { properties: Vec<TsProp> },
    /// type Foo = ...
    TypeAlias { ty: TsType },
    /// A frozen value object plus a same-named union of its values.
    ConstEnum { values: Vec<(String, TsLiteral)> },
}

/// An exported type in `types.ts`.
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
    /// JSDoc lines.
    pub docs: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum TsStmt {
    /// const declaration; `name` may be a destructuring pattern
    Const { name: String, init: TsExpr },
    Return(TsExpr),
}

#[derive(Debug, Clone)]
pub struct TsFunction {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_export: bool,
    /// `const name = (...) => { ... }` instead of `function name(...) { ... }`
    pub is_arrow: bool,
    /// JSDoc lines.
    pub docs: Vec<String>,
}

/// One generated file, before printing.
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Leading line comment (the generated-file banner).
    pub header: Option<String>,
    pub imports: Vec<TsImport>,
    /// `export * from "<module>"` lines
    pub reexports: Vec<String>,
    pub types: Vec<TsTypeDef>,
    pub functions: Vec<TsFunction>,
}
