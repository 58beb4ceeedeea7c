//! Metadata catalog
//!
//! The single source of truth for "what members does a type have" and
//! "which free functions are callable on it". Both the evaluator's dispatch
//! and the completion resolver query this registry, so what completion
//! offers is exactly what execution accepts.
//!
//! The builtin module set is fixed for the lifetime of the process, so the
//! registry is built once behind a `Lazy`.

use indexmap::IndexSet;
use once_cell::sync::Lazy;

use super::eval::EvalError;
use super::types::{apply, satisfies, unify, Constraint, Iface, Subst, Ty};
use super::value::{compare_values, MapKey, Value};

/// Native implementation of an instance member: receiver plus arguments
pub type NativeMethod = fn(&Value, &[Value]) -> Result<Value, EvalError>;

/// Native implementation of a free function
pub type NativeFunction = fn(&[Value]) -> Result<Value, EvalError>;

/// Instance method, instantiated for a concrete receiver type
#[derive(Clone)]
pub struct MethodDef {
    pub name: &'static str,
    pub params: Vec<(&'static str, Ty)>,
    pub ret: Ty,
    pub native: NativeMethod,
}

impl MethodDef {
    /// `Ret name(ParamTy param, ...)`
    pub fn signature(&self) -> String {
        format!(
            "{} {}({})",
            self.ret,
            self.name,
            render_params(&self.params, None)
        )
    }
}

/// Instance property; `index_params` is non-empty for indexers
#[derive(Clone)]
pub struct PropertyDef {
    pub name: &'static str,
    pub ty: Ty,
    pub index_params: Vec<(&'static str, Ty)>,
    pub native: NativeMethod,
}

impl PropertyDef {
    /// `Ty name` for plain properties, `Ty name[ParamTy param]` for indexers
    pub fn signature(&self) -> String {
        if self.index_params.is_empty() {
            format!("{} {}", self.ty, self.name)
        } else {
            format!(
                "{} {}[{}]",
                self.ty,
                self.name,
                render_params(&self.index_params, None)
            )
        }
    }
}

/// A declared type parameter and its constraints
#[derive(Clone)]
pub struct TypeParamDef {
    pub name: &'static str,
    pub constraints: Vec<Constraint>,
}

/// Free function registered in a builtin module
#[derive(Clone)]
pub struct FunctionDef {
    pub name: &'static str,
    pub params: Vec<(&'static str, Ty)>,
    pub ret: Ty,
    pub type_params: Vec<TypeParamDef>,
    /// Extension-capable: usable as a member of its first parameter's type
    pub extension: bool,
    pub native: NativeFunction,
}

impl FunctionDef {
    /// Signature as seen on a receiver: the receiver parameter is omitted
    /// and type parameters are substituted with the receiver's types.
    pub fn extension_signature(&self, subst: &Subst) -> String {
        format!(
            "{} {}({})",
            apply(&self.ret, subst),
            self.name,
            render_params(&self.params[1..], Some(subst))
        )
    }
}

/// A builtin module: a namespace holding free functions
pub struct ModuleDef {
    pub name: &'static str,
    pub functions: Vec<FunctionDef>,
}

fn render_params(params: &[(&'static str, Ty)], subst: Option<&Subst>) -> String {
    params
        .iter()
        .map(|(name, ty)| {
            let ty = match subst {
                Some(s) => apply(ty, s),
                None => ty.clone(),
            };
            format!("{} {}", ty, name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Process-wide catalog instance
pub static CATALOG: Lazy<Catalog> = Lazy::new(Catalog::build);

/// Registry of builtin modules and instance members
pub struct Catalog {
    modules: Vec<ModuleDef>,
}

impl Catalog {
    fn build() -> Self {
        Self {
            modules: vec![core_module(), seq_module(), text_module(), math_module()],
        }
    }

    /// Is `name` a known builtin module?
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }

    /// Names of all builtin modules
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    /// Public instance methods of a runtime type
    pub fn methods_of(&self, ty: &Ty) -> Vec<MethodDef> {
        match ty {
            Ty::Str => str_methods(),
            Ty::List(el) => list_methods(el),
            Ty::Map(k, v) => map_methods(k, v),
            Ty::Int => int_methods(),
            Ty::Float => float_methods(),
            Ty::Bool => bool_methods(),
            Ty::Range => range_methods(),
            _ => Vec::new(),
        }
    }

    /// Public instance properties of a runtime type
    pub fn properties_of(&self, ty: &Ty) -> Vec<PropertyDef> {
        match ty {
            Ty::Str => str_properties(),
            Ty::List(el) => list_properties(el),
            Ty::Map(k, v) => map_properties(k, v),
            Ty::Range => range_properties(),
            _ => Vec::new(),
        }
    }

    /// Find an instance method by name and arity
    pub fn lookup_method(&self, ty: &Ty, name: &str, arity: usize) -> Option<MethodDef> {
        self.methods_of(ty)
            .into_iter()
            .find(|m| m.name == name && m.params.len() == arity)
    }

    /// Find a plain (non-indexer) property by name
    pub fn lookup_property(&self, ty: &Ty, name: &str) -> Option<PropertyDef> {
        self.properties_of(ty)
            .into_iter()
            .find(|p| p.name == name && p.index_params.is_empty())
    }

    /// Find the indexer of a type, if it has one
    pub fn lookup_indexer(&self, ty: &Ty) -> Option<PropertyDef> {
        self.properties_of(ty)
            .into_iter()
            .find(|p| !p.index_params.is_empty())
    }

    fn imported_functions<'a>(&'a self, imports: &IndexSet<String>) -> Vec<&'a FunctionDef> {
        self.modules
            .iter()
            .filter(|m| imports.contains(m.name))
            .flat_map(|m| m.functions.iter())
            .collect()
    }

    /// Resolve a free-function call against the imported modules.
    ///
    /// Same-name candidates are disambiguated by arity first, then by which
    /// declared parameter list accepts the actual argument types.
    pub fn resolve_call(
        &self,
        imports: &IndexSet<String>,
        name: &str,
        args: &[Value],
    ) -> Option<&FunctionDef> {
        let candidates: Vec<&FunctionDef> = self
            .imported_functions(imports)
            .into_iter()
            .filter(|d| d.name == name && d.params.len() == args.len())
            .collect();

        candidates
            .iter()
            .find(|def| {
                let mut subst = Subst::new();
                def.params
                    .iter()
                    .zip(args)
                    .all(|((_, ty), arg)| unify(&arg.ty(), ty, &mut subst))
            })
            .copied()
            .or_else(|| candidates.first().copied())
    }

    /// All extension-capable functions applicable to a receiver type.
    ///
    /// A function applies when its first parameter's declared type unifies
    /// with the receiver type and every type-parameter constraint holds for
    /// the resulting substitution.
    pub fn extensions_for(
        &self,
        imports: &IndexSet<String>,
        recv: &Ty,
    ) -> Vec<(&FunctionDef, Subst)> {
        self.imported_functions(imports)
            .into_iter()
            .filter(|d| d.extension && !d.params.is_empty())
            .filter_map(|def| {
                let mut subst = Subst::new();
                if !unify(recv, &def.params[0].1, &mut subst) {
                    return None;
                }
                let ok = def
                    .type_params
                    .iter()
                    .all(|tp| satisfies(subst.get(tp.name), &tp.constraints));
                ok.then_some((def, subst))
            })
            .collect()
    }

    /// Resolve a member-style call to an extension function
    pub fn resolve_extension(
        &self,
        imports: &IndexSet<String>,
        recv: &Ty,
        name: &str,
        args_arity: usize,
    ) -> Option<&FunctionDef> {
        self.extensions_for(imports, recv)
            .into_iter()
            .map(|(def, _)| def)
            .find(|d| d.name == name && d.params.len() == args_arity + 1)
    }

    /// Is `name` a method or applicable extension of the type?
    pub fn has_callable_named(&self, imports: &IndexSet<String>, ty: &Ty, name: &str) -> bool {
        self.methods_of(ty).iter().any(|m| m.name == name)
            || self
                .extensions_for(imports, ty)
                .iter()
                .any(|(d, _)| d.name == name)
    }
}

// === Builtin modules ===

fn core_module() -> ModuleDef {
    ModuleDef {
        name: "std.core",
        functions: vec![
            FunctionDef {
                name: "print",
                params: vec![("value", Ty::Any)],
                ret: Ty::Nil,
                type_params: vec![],
                extension: false,
                native: core_print,
            },
            FunctionDef {
                name: "type_of",
                params: vec![("value", Ty::Any)],
                ret: Ty::Str,
                type_params: vec![],
                extension: false,
                native: core_type_of,
            },
            FunctionDef {
                name: "range",
                params: vec![("start", Ty::Int), ("end", Ty::Int)],
                ret: Ty::Range,
                type_params: vec![],
                extension: false,
                native: core_range,
            },
            FunctionDef {
                name: "int",
                params: vec![("value", Ty::Str)],
                ret: Ty::Int,
                type_params: vec![],
                extension: false,
                native: core_int_from_str,
            },
            FunctionDef {
                name: "int",
                params: vec![("value", Ty::Float)],
                ret: Ty::Int,
                type_params: vec![],
                extension: false,
                native: core_int_from_float,
            },
            FunctionDef {
                name: "len",
                params: vec![("value", Ty::Var("T"))],
                ret: Ty::Int,
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Countable)],
                }],
                extension: true,
                native: core_len,
            },
            FunctionDef {
                name: "str",
                params: vec![("value", Ty::Var("T"))],
                ret: Ty::Str,
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![],
                }],
                extension: true,
                native: core_str,
            },
            FunctionDef {
                name: "copy",
                params: vec![("value", Ty::Var("T"))],
                ret: Ty::Var("T"),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Container],
                }],
                extension: true,
                native: core_copy,
            },
        ],
    }
}

fn seq_module() -> ModuleDef {
    let seq_t = || Ty::Seq(Box::new(Ty::Var("T")));
    let list_t = || Ty::List(Box::new(Ty::Var("T")));

    ModuleDef {
        name: "std.seq",
        functions: vec![
            FunctionDef {
                name: "sorted",
                params: vec![("values", seq_t())],
                ret: list_t(),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Ordered)],
                }],
                extension: true,
                native: seq_sorted,
            },
            FunctionDef {
                name: "reversed",
                params: vec![("values", seq_t())],
                ret: list_t(),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![],
                }],
                extension: true,
                native: seq_reversed,
            },
            FunctionDef {
                name: "sum",
                params: vec![("values", seq_t())],
                ret: Ty::Var("T"),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Numeric)],
                }],
                extension: true,
                native: seq_sum,
            },
            FunctionDef {
                name: "min",
                params: vec![("values", seq_t())],
                ret: Ty::Var("T"),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Ordered)],
                }],
                extension: true,
                native: seq_min,
            },
            FunctionDef {
                name: "max",
                params: vec![("values", seq_t())],
                ret: Ty::Var("T"),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Ordered)],
                }],
                extension: true,
                native: seq_max,
            },
            FunctionDef {
                name: "unique",
                params: vec![("values", seq_t())],
                ret: list_t(),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Equatable)],
                }],
                extension: true,
                native: seq_unique,
            },
            FunctionDef {
                name: "to_list",
                params: vec![("values", seq_t())],
                ret: list_t(),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![],
                }],
                extension: true,
                native: seq_to_list,
            },
            FunctionDef {
                name: "appended",
                params: vec![("values", list_t()), ("item", Ty::Var("T"))],
                ret: list_t(),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![],
                }],
                extension: true,
                native: seq_appended,
            },
            FunctionDef {
                name: "joined",
                params: vec![
                    ("parts", Ty::List(Box::new(Ty::Str))),
                    ("separator", Ty::Str),
                ],
                ret: Ty::Str,
                type_params: vec![],
                extension: true,
                native: seq_joined,
            },
        ],
    }
}

fn text_module() -> ModuleDef {
    ModuleDef {
        name: "std.text",
        functions: vec![
            FunctionDef {
                name: "trimmed",
                params: vec![("text", Ty::Str)],
                ret: Ty::Str,
                type_params: vec![],
                extension: true,
                native: text_trimmed,
            },
            FunctionDef {
                name: "words",
                params: vec![("text", Ty::Str)],
                ret: Ty::List(Box::new(Ty::Str)),
                type_params: vec![],
                extension: true,
                native: text_words,
            },
            FunctionDef {
                name: "lines",
                params: vec![("text", Ty::Str)],
                ret: Ty::List(Box::new(Ty::Str)),
                type_params: vec![],
                extension: true,
                native: text_lines,
            },
            FunctionDef {
                name: "repeated",
                params: vec![("text", Ty::Str), ("times", Ty::Int)],
                ret: Ty::Str,
                type_params: vec![],
                extension: true,
                native: text_repeated,
            },
            FunctionDef {
                name: "padded",
                params: vec![("text", Ty::Str), ("width", Ty::Int)],
                ret: Ty::Str,
                type_params: vec![],
                extension: true,
                native: text_padded,
            },
        ],
    }
}

fn math_module() -> ModuleDef {
    ModuleDef {
        name: "std.math",
        functions: vec![
            FunctionDef {
                name: "abs",
                params: vec![("value", Ty::Var("T"))],
                ret: Ty::Var("T"),
                type_params: vec![TypeParamDef {
                    name: "T",
                    constraints: vec![Constraint::Implements(Iface::Numeric)],
                }],
                extension: true,
                native: math_abs,
            },
            FunctionDef {
                name: "sqrt",
                params: vec![("value", Ty::Float)],
                ret: Ty::Float,
                type_params: vec![],
                extension: true,
                native: math_sqrt,
            },
            FunctionDef {
                name: "pow",
                params: vec![("base", Ty::Float), ("exponent", Ty::Float)],
                ret: Ty::Float,
                type_params: vec![],
                extension: true,
                native: math_pow,
            },
            FunctionDef {
                name: "floor",
                params: vec![("value", Ty::Float)],
                ret: Ty::Int,
                type_params: vec![],
                extension: true,
                native: math_floor,
            },
            FunctionDef {
                name: "ceil",
                params: vec![("value", Ty::Float)],
                ret: Ty::Int,
                type_params: vec![],
                extension: true,
                native: math_ceil,
            },
        ],
    }
}

// === Instance member tables ===

fn str_methods() -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "upper",
            params: vec![],
            ret: Ty::Str,
            native: str_upper,
        },
        MethodDef {
            name: "lower",
            params: vec![],
            ret: Ty::Str,
            native: str_lower,
        },
        MethodDef {
            name: "contains",
            params: vec![("needle", Ty::Str)],
            ret: Ty::Bool,
            native: str_contains,
        },
        MethodDef {
            name: "starts_with",
            params: vec![("prefix", Ty::Str)],
            ret: Ty::Bool,
            native: str_starts_with,
        },
        MethodDef {
            name: "ends_with",
            params: vec![("suffix", Ty::Str)],
            ret: Ty::Bool,
            native: str_ends_with,
        },
        MethodDef {
            name: "split",
            params: vec![("separator", Ty::Str)],
            ret: Ty::List(Box::new(Ty::Str)),
            native: str_split,
        },
        MethodDef {
            name: "replace",
            params: vec![("from", Ty::Str), ("to", Ty::Str)],
            ret: Ty::Str,
            native: str_replace,
        },
        MethodDef {
            name: "slice",
            params: vec![("start", Ty::Int)],
            ret: Ty::Str,
            native: str_slice_from,
        },
        MethodDef {
            name: "slice",
            params: vec![("start", Ty::Int), ("end", Ty::Int)],
            ret: Ty::Str,
            native: str_slice_range,
        },
    ]
}

fn str_properties() -> Vec<PropertyDef> {
    vec![
        PropertyDef {
            name: "length",
            ty: Ty::Int,
            index_params: vec![],
            native: str_length,
        },
        PropertyDef {
            name: "at",
            ty: Ty::Str,
            index_params: vec![("index", Ty::Int)],
            native: str_at,
        },
    ]
}

fn list_methods(el: &Ty) -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "contains",
            params: vec![("item", el.clone())],
            ret: Ty::Bool,
            native: list_contains,
        },
        MethodDef {
            name: "index_of",
            params: vec![("item", el.clone())],
            ret: Ty::Int,
            native: list_index_of,
        },
        MethodDef {
            name: "slice",
            params: vec![("start", Ty::Int)],
            ret: Ty::List(Box::new(el.clone())),
            native: list_slice_from,
        },
        MethodDef {
            name: "slice",
            params: vec![("start", Ty::Int), ("end", Ty::Int)],
            ret: Ty::List(Box::new(el.clone())),
            native: list_slice_range,
        },
    ]
}

fn list_properties(el: &Ty) -> Vec<PropertyDef> {
    vec![
        PropertyDef {
            name: "length",
            ty: Ty::Int,
            index_params: vec![],
            native: list_length,
        },
        PropertyDef {
            name: "at",
            ty: el.clone(),
            index_params: vec![("index", Ty::Int)],
            native: list_at,
        },
    ]
}

fn map_methods(k: &Ty, v: &Ty) -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "keys",
            params: vec![],
            ret: Ty::List(Box::new(k.clone())),
            native: map_keys,
        },
        MethodDef {
            name: "values",
            params: vec![],
            ret: Ty::List(Box::new(v.clone())),
            native: map_values,
        },
        MethodDef {
            name: "contains_key",
            params: vec![("key", k.clone())],
            ret: Ty::Bool,
            native: map_contains_key,
        },
        MethodDef {
            name: "get",
            params: vec![("key", k.clone())],
            ret: v.clone(),
            native: map_get,
        },
        MethodDef {
            name: "get",
            params: vec![("key", k.clone()), ("default", v.clone())],
            ret: v.clone(),
            native: map_get_or,
        },
    ]
}

fn map_properties(k: &Ty, v: &Ty) -> Vec<PropertyDef> {
    vec![
        PropertyDef {
            name: "length",
            ty: Ty::Int,
            index_params: vec![],
            native: map_length,
        },
        PropertyDef {
            name: "at",
            ty: v.clone(),
            index_params: vec![("key", k.clone())],
            native: map_at,
        },
    ]
}

fn int_methods() -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "to_float",
            params: vec![],
            ret: Ty::Float,
            native: int_to_float,
        },
        MethodDef {
            name: "to_str",
            params: vec![],
            ret: Ty::Str,
            native: any_to_str,
        },
    ]
}

fn float_methods() -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "round",
            params: vec![],
            ret: Ty::Int,
            native: float_round,
        },
        MethodDef {
            name: "trunc",
            params: vec![],
            ret: Ty::Int,
            native: float_trunc,
        },
        MethodDef {
            name: "to_str",
            params: vec![],
            ret: Ty::Str,
            native: any_to_str,
        },
    ]
}

fn bool_methods() -> Vec<MethodDef> {
    vec![MethodDef {
        name: "to_str",
        params: vec![],
        ret: Ty::Str,
        native: any_to_str,
    }]
}

fn range_methods() -> Vec<MethodDef> {
    vec![
        MethodDef {
            name: "to_list",
            params: vec![],
            ret: Ty::List(Box::new(Ty::Int)),
            native: range_to_list,
        },
        MethodDef {
            name: "contains",
            params: vec![("value", Ty::Int)],
            ret: Ty::Bool,
            native: range_contains,
        },
    ]
}

fn range_properties() -> Vec<PropertyDef> {
    vec![PropertyDef {
        name: "length",
        ty: Ty::Int,
        index_params: vec![],
        native: range_length,
    }]
}

// === Native helpers ===

fn argv<'a>(args: &'a [Value], i: usize) -> Result<&'a Value, EvalError> {
    args.get(i)
        .ok_or_else(|| EvalError::Message(format!("missing argument {}", i + 1)))
}

fn want_str(value: &Value) -> Result<&str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::TypeMismatch(format!(
            "expected Str, got {}",
            other.type_name()
        ))),
    }
}

fn want_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(v) => Ok(*v),
        other => Err(EvalError::TypeMismatch(format!(
            "expected Int, got {}",
            other.type_name()
        ))),
    }
}

fn want_float_like(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        other => Err(EvalError::TypeMismatch(format!(
            "expected Float, got {}",
            other.type_name()
        ))),
    }
}

fn want_list(value: &Value) -> Result<&Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(EvalError::TypeMismatch(format!(
            "expected List, got {}",
            other.type_name()
        ))),
    }
}

fn want_seq(value: &Value) -> Result<Vec<Value>, EvalError> {
    value.seq_items().ok_or_else(|| {
        EvalError::TypeMismatch(format!("{} is not a sequence", value.type_name()))
    })
}

fn want_key(value: &Value) -> Result<MapKey, EvalError> {
    MapKey::from_value(value).ok_or_else(|| {
        EvalError::TypeMismatch(format!(
            "{} cannot be used as a map key",
            value.type_name()
        ))
    })
}

fn clamp_bounds(start: i64, end: i64, len: usize) -> (usize, usize) {
    let start = start.clamp(0, len as i64) as usize;
    let end = end.clamp(0, len as i64) as usize;
    (start, end.max(start))
}

// === std.core natives ===

fn core_print(args: &[Value]) -> Result<Value, EvalError> {
    println!("{}", argv(args, 0)?);
    Ok(Value::Nil)
}

fn core_type_of(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(argv(args, 0)?.type_name()))
}

fn core_range(args: &[Value]) -> Result<Value, EvalError> {
    let start = want_int(argv(args, 0)?)?;
    let end = want_int(argv(args, 1)?)?;
    Ok(Value::Range(start, end))
}

fn core_int_from_str(args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(argv(args, 0)?)?;
    text.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| EvalError::Message(format!("cannot parse {:?} as Int", text)))
}

fn core_int_from_float(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_float_like(argv(args, 0)?)? as i64))
}

fn core_len(args: &[Value]) -> Result<Value, EvalError> {
    let count = match argv(args, 0)? {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Range(start, end) => (end - start).max(0) as usize,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "{} has no length",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(count as i64))
}

fn core_str(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(argv(args, 0)?.to_string()))
}

fn core_copy(args: &[Value]) -> Result<Value, EvalError> {
    Ok(argv(args, 0)?.clone())
}

// === std.seq natives ===

fn seq_sorted(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = want_seq(argv(args, 0)?)?;
    items.sort_by(|a, b| compare_values(a, b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Value::List(items))
}

fn seq_reversed(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = want_seq(argv(args, 0)?)?;
    items.reverse();
    Ok(Value::List(items))
}

fn seq_sum(args: &[Value]) -> Result<Value, EvalError> {
    let items = want_seq(argv(args, 0)?)?;
    let mut int_acc: i64 = 0;
    let mut float_acc: f64 = 0.0;
    let mut float_seen = false;
    for item in &items {
        match item {
            Value::Int(v) => int_acc += v,
            Value::Float(v) => {
                float_seen = true;
                float_acc += v;
            }
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "cannot sum {} elements",
                    other.type_name()
                )))
            }
        }
    }
    if float_seen {
        Ok(Value::Float(float_acc + int_acc as f64))
    } else {
        Ok(Value::Int(int_acc))
    }
}

fn seq_extreme(args: &[Value], want_max: bool) -> Result<Value, EvalError> {
    let items = want_seq(argv(args, 0)?)?;
    let mut best: Option<Value> = None;
    for item in items {
        best = Some(match best {
            None => item,
            Some(current) => {
                let ord = compare_values(&item, &current).ok_or_else(|| {
                    EvalError::TypeMismatch("sequence elements are not comparable".into())
                })?;
                if (want_max && ord == std::cmp::Ordering::Greater)
                    || (!want_max && ord == std::cmp::Ordering::Less)
                {
                    item
                } else {
                    current
                }
            }
        });
    }
    best.ok_or_else(|| EvalError::Message("empty sequence has no extremum".into()))
}

fn seq_min(args: &[Value]) -> Result<Value, EvalError> {
    seq_extreme(args, false)
}

fn seq_max(args: &[Value]) -> Result<Value, EvalError> {
    seq_extreme(args, true)
}

fn seq_unique(args: &[Value]) -> Result<Value, EvalError> {
    let items = want_seq(argv(args, 0)?)?;
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(Value::List(out))
}

fn seq_to_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::List(want_seq(argv(args, 0)?)?))
}

fn seq_appended(args: &[Value]) -> Result<Value, EvalError> {
    let mut items = want_list(argv(args, 0)?)?.clone();
    items.push(argv(args, 1)?.clone());
    Ok(Value::List(items))
}

fn seq_joined(args: &[Value]) -> Result<Value, EvalError> {
    let items = want_list(argv(args, 0)?)?;
    let separator = want_str(argv(args, 1)?)?;
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(want_str(item)?.to_string());
    }
    Ok(Value::Str(parts.join(separator)))
}

// === std.text natives ===

fn text_trimmed(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(want_str(argv(args, 0)?)?.trim().to_string()))
}

fn text_words(args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(argv(args, 0)?)?;
    Ok(Value::List(
        text.split_whitespace()
            .map(|w| Value::Str(w.to_string()))
            .collect(),
    ))
}

fn text_lines(args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(argv(args, 0)?)?;
    Ok(Value::List(
        text.lines().map(|l| Value::Str(l.to_string())).collect(),
    ))
}

fn text_repeated(args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(argv(args, 0)?)?;
    let times = want_int(argv(args, 1)?)?.max(0) as usize;
    Ok(Value::Str(text.repeat(times)))
}

fn text_padded(args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(argv(args, 0)?)?;
    let width = want_int(argv(args, 1)?)?.max(0) as usize;
    let current = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(current)));
    Ok(Value::Str(out))
}

// === std.math natives ===

fn math_abs(args: &[Value]) -> Result<Value, EvalError> {
    match argv(args, 0)? {
        Value::Int(v) => Ok(Value::Int(v.abs())),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(EvalError::TypeMismatch(format!(
            "expected a numeric value, got {}",
            other.type_name()
        ))),
    }
}

fn math_sqrt(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Float(want_float_like(argv(args, 0)?)?.sqrt()))
}

fn math_pow(args: &[Value]) -> Result<Value, EvalError> {
    let base = want_float_like(argv(args, 0)?)?;
    let exponent = want_float_like(argv(args, 1)?)?;
    Ok(Value::Float(base.powf(exponent)))
}

fn math_floor(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_float_like(argv(args, 0)?)?.floor() as i64))
}

fn math_ceil(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_float_like(argv(args, 0)?)?.ceil() as i64))
}

// === Str members ===

fn str_upper(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(want_str(recv)?.to_uppercase()))
}

fn str_lower(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(want_str(recv)?.to_lowercase()))
}

fn str_contains(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(
        want_str(recv)?.contains(want_str(argv(args, 0)?)?),
    ))
}

fn str_starts_with(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(
        want_str(recv)?.starts_with(want_str(argv(args, 0)?)?),
    ))
}

fn str_ends_with(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(
        want_str(recv)?.ends_with(want_str(argv(args, 0)?)?),
    ))
}

fn str_split(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(recv)?;
    let separator = want_str(argv(args, 0)?)?;
    Ok(Value::List(
        text.split(separator)
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

fn str_replace(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let text = want_str(recv)?;
    let from = want_str(argv(args, 0)?)?;
    let to = want_str(argv(args, 1)?)?;
    Ok(Value::Str(text.replace(from, to)))
}

fn str_slice_impl(recv: &Value, start: i64, end: Option<i64>) -> Result<Value, EvalError> {
    let chars: Vec<char> = want_str(recv)?.chars().collect();
    let end = end.unwrap_or(chars.len() as i64);
    let (start, end) = clamp_bounds(start, end, chars.len());
    Ok(Value::Str(chars[start..end].iter().collect()))
}

fn str_slice_from(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    str_slice_impl(recv, want_int(argv(args, 0)?)?, None)
}

fn str_slice_range(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    str_slice_impl(
        recv,
        want_int(argv(args, 0)?)?,
        Some(want_int(argv(args, 1)?)?),
    )
}

fn str_length(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_str(recv)?.chars().count() as i64))
}

fn str_at(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let chars: Vec<char> = want_str(recv)?.chars().collect();
    let index = want_int(argv(args, 0)?)?;
    if index < 0 || index as usize >= chars.len() {
        return Err(EvalError::IndexOutOfBounds {
            index,
            len: chars.len(),
        });
    }
    Ok(Value::Str(chars[index as usize].to_string()))
}

// === List members ===

fn list_contains(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(want_list(recv)?.contains(argv(args, 0)?)))
}

fn list_index_of(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let item = argv(args, 0)?;
    let index = want_list(recv)?
        .iter()
        .position(|v| v == item)
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(Value::Int(index))
}

fn list_slice_impl(recv: &Value, start: i64, end: Option<i64>) -> Result<Value, EvalError> {
    let items = want_list(recv)?;
    let end = end.unwrap_or(items.len() as i64);
    let (start, end) = clamp_bounds(start, end, items.len());
    Ok(Value::List(items[start..end].to_vec()))
}

fn list_slice_from(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    list_slice_impl(recv, want_int(argv(args, 0)?)?, None)
}

fn list_slice_range(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    list_slice_impl(
        recv,
        want_int(argv(args, 0)?)?,
        Some(want_int(argv(args, 1)?)?),
    )
}

fn list_length(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_list(recv)?.len() as i64))
}

fn list_at(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let items = want_list(recv)?;
    let index = want_int(argv(args, 0)?)?;
    if index < 0 || index as usize >= items.len() {
        return Err(EvalError::IndexOutOfBounds {
            index,
            len: items.len(),
        });
    }
    Ok(items[index as usize].clone())
}

// === Map members ===

fn want_map_entries(value: &Value) -> Result<&indexmap::IndexMap<MapKey, Value>, EvalError> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(EvalError::TypeMismatch(format!(
            "expected Map, got {}",
            other.type_name()
        ))),
    }
}

fn map_keys(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::List(
        want_map_entries(recv)?.keys().map(|k| k.to_value()).collect(),
    ))
}

fn map_values(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::List(want_map_entries(recv)?.values().cloned().collect()))
}

fn map_contains_key(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let key = want_key(argv(args, 0)?)?;
    Ok(Value::Bool(want_map_entries(recv)?.contains_key(&key)))
}

fn map_get(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let key = want_key(argv(args, 0)?)?;
    Ok(want_map_entries(recv)?
        .get(&key)
        .cloned()
        .unwrap_or(Value::Nil))
}

fn map_get_or(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let key = want_key(argv(args, 0)?)?;
    Ok(want_map_entries(recv)?
        .get(&key)
        .cloned()
        .unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::Nil)))
}

fn map_length(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_map_entries(recv)?.len() as i64))
}

fn map_at(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let key = want_key(argv(args, 0)?)?;
    want_map_entries(recv)?
        .get(&key)
        .cloned()
        .ok_or_else(|| EvalError::KeyNotFound(key.to_value().to_string()))
}

// === Scalar members ===

fn int_to_float(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Float(want_int(recv)? as f64))
}

fn any_to_str(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(recv.to_string()))
}

fn float_round(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_float_like(recv)?.round() as i64))
}

fn float_trunc(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(want_float_like(recv)?.trunc() as i64))
}

// === Range members ===

fn want_range(value: &Value) -> Result<(i64, i64), EvalError> {
    match value {
        Value::Range(start, end) => Ok((*start, *end)),
        other => Err(EvalError::TypeMismatch(format!(
            "expected Range, got {}",
            other.type_name()
        ))),
    }
}

fn range_to_list(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    let (start, end) = want_range(recv)?;
    Ok(Value::List((start..end).map(Value::Int).collect()))
}

fn range_contains(recv: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let (start, end) = want_range(recv)?;
    let value = want_int(argv(args, 0)?)?;
    Ok(Value::Bool(value >= start && value < end))
}

fn range_length(recv: &Value, _args: &[Value]) -> Result<Value, EvalError> {
    let (start, end) = want_range(recv)?;
    Ok(Value::Int((end - start).max(0)))
}
