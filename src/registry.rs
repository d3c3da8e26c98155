//! Name-registry façade
//!
//! A compatibility layer over the combinator core for callers that
//! address schemas by string name (`"u64"`, `"vector<string>"`,
//! `"Option<Coin>"`) rather than by holding schema values directly.
//! New code should use the combinators; the registry exists for API
//! parity with older, name-driven integrations.
//!
//! A [`Registry`] is an ordinary per-instance object: there is no
//! process-wide registration of any kind. Each instance maps names to
//! either a concrete [`DynSchema`], a generic factory instantiated
//! through `Name<A, B>` type expressions, or an alias for another
//! name. Aliases resolve transitively; the chain of visited names is
//! tracked and a repeat is rejected as a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::schema::{adt, prim, seq, DynSchema};

type FactoryFn = Arc<dyn Fn(Vec<DynSchema>) -> DynSchema + Send + Sync>;

/// Number of type arguments a generic factory accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn admits(self, actual: usize) -> bool {
        match self {
            Arity::Exact(n) => actual == n,
            Arity::AtLeast(n) => actual >= n,
        }
    }

    fn expected(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }
}

enum Entry {
    Schema(DynSchema),
    Factory { arity: Arity, build: FactoryFn },
    Alias(String),
}

/// Parsed form of a `Name<A, B, …>` type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    /// Parses a type expression such as `map<string, vector<u8>>`.
    ///
    /// Whitespace around names and argument separators is ignored.
    pub fn parse(expr: &str) -> Result<Self, SchemaError> {
        let bad = |reason: &'static str| SchemaError::BadTypeExpression {
            expr: expr.to_string(),
            reason,
        };
        let mut cursor = Cursor {
            rest: expr.trim(),
        };
        let parsed = cursor.parse_expr().ok_or_else(|| bad("unbalanced or empty expression"))?;
        if cursor.rest.trim().is_empty() {
            Ok(parsed)
        } else {
            Err(bad("trailing input after the outermost type"))
        }
    }
}

/// Hand-rolled recursive-descent state for [`TypeExpr::parse`].
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn parse_expr(&mut self) -> Option<TypeExpr> {
        self.rest = self.rest.trim_start();
        let name_len = self
            .rest
            .find(|c| c == '<' || c == '>' || c == ',')
            .unwrap_or(self.rest.len());
        let name = self.rest[..name_len].trim().to_string();
        if name.is_empty() {
            return None;
        }
        self.rest = &self.rest[name_len..];

        let mut args = Vec::new();
        if let Some(stripped) = self.rest.strip_prefix('<') {
            self.rest = stripped;
            loop {
                args.push(self.parse_expr()?);
                self.rest = self.rest.trim_start();
                if let Some(stripped) = self.rest.strip_prefix(',') {
                    self.rest = stripped;
                } else if let Some(stripped) = self.rest.strip_prefix('>') {
                    self.rest = stripped;
                    break;
                } else {
                    return None;
                }
            }
        }
        Some(TypeExpr { name, args })
    }
}

/// String-keyed schema registry with transitive aliases.
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Default for Registry {
    /// Equivalent to [`Registry::with_primitives`].
    fn default() -> Self {
        Self::with_primitives()
    }
}

impl Registry {
    /// Constructs an empty registry with no names at all.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Constructs a registry pre-populated with the primitive schemas
    /// under their canonical names (`u8` through `u256`, `bool`,
    /// `uleb128`, `string`) and the generic shapes `vector<T>`,
    /// `option<T>`, `map<K, V>`, and `tuple<…>`.
    #[must_use]
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry
            .register("u8", prim::u8().to_dynamic())
            .register("u16", prim::u16().to_dynamic())
            .register("u32", prim::u32().to_dynamic())
            .register("u64", prim::u64().to_dynamic())
            .register("u128", prim::u128().to_dynamic())
            .register("u256", prim::u256().to_dynamic())
            .register("bool", prim::bool().to_dynamic())
            .register("uleb128", prim::uleb128().to_dynamic())
            .register("string", prim::string().to_dynamic())
            .register_factory("vector", Arity::Exact(1), |mut args| {
                seq::vector(args.remove(0)).to_dynamic()
            })
            .register_factory("option", Arity::Exact(1), |mut args| {
                adt::option(args.remove(0)).to_dynamic()
            })
            .register_factory("map", Arity::Exact(2), |mut args| {
                let value = args.remove(1);
                adt::dyn_map(args.remove(0), value)
            })
            .register_factory("tuple", Arity::AtLeast(1), adt::tuple);
        registry
    }

    /// Registers a concrete schema under `name`, replacing any
    /// previous entry of that name.
    pub fn register(&mut self, name: impl Into<String>, schema: DynSchema) -> &mut Self {
        self.entries.insert(name.into(), Entry::Schema(schema));
        self
    }

    /// Registers a generic schema factory under `name`.
    ///
    /// The factory receives the already-resolved argument schemas of
    /// a `name<…>` expression; `arity` is enforced before it runs.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, arity: Arity, build: F) -> &mut Self
    where
        F: Fn(Vec<DynSchema>) -> DynSchema + Send + Sync + 'static,
    {
        self.entries.insert(
            name.into(),
            Entry::Factory {
                arity,
                build: Arc::new(build),
            },
        );
        self
    }

    /// Registers `alias` as another name for `target`.
    ///
    /// The target need not exist yet; resolution is late-bound, and a
    /// dangling alias only fails when looked up.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.entries.insert(alias.into(), Entry::Alias(target.into()));
        self
    }

    /// Resolves a type expression to a schema.
    ///
    /// # Errors
    ///
    /// Fails if the expression does not parse, names an unregistered
    /// schema, instantiates a generic with the wrong number of
    /// arguments, applies arguments to a non-generic schema, or runs
    /// into an alias cycle.
    pub fn resolve(&self, expr: &str) -> Result<DynSchema, SchemaError> {
        let parsed = TypeExpr::parse(expr)?;
        self.build(&parsed)
    }

    fn build(&self, expr: &TypeExpr) -> Result<DynSchema, SchemaError> {
        match self.follow_aliases(&expr.name)? {
            Entry::Schema(schema) => {
                if expr.args.is_empty() {
                    Ok(schema.clone())
                } else {
                    Err(SchemaError::Arity {
                        name: expr.name.clone(),
                        expected: 0,
                        actual: expr.args.len(),
                    })
                }
            }
            Entry::Factory { arity, build } => {
                if !arity.admits(expr.args.len()) {
                    return Err(SchemaError::Arity {
                        name: expr.name.clone(),
                        expected: arity.expected(),
                        actual: expr.args.len(),
                    });
                }
                let args = expr
                    .args
                    .iter()
                    .map(|arg| self.build(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(build(args))
            }
            Entry::Alias(_) => unreachable!("follow_aliases never returns an alias entry"),
        }
    }

    fn follow_aliases(&self, name: &str) -> Result<&Entry, SchemaError> {
        let mut chain = vec![name.to_string()];
        let mut current = name;
        loop {
            let entry = self
                .entries
                .get(current)
                .ok_or_else(|| SchemaError::UnknownName(current.to_string()))?;
            match entry {
                Entry::Alias(target) => {
                    if chain.iter().any(|seen| seen == target) {
                        chain.push(target.clone());
                        return Err(SchemaError::AliasCycle { chain });
                    }
                    chain.push(target.clone());
                    current = target;
                }
                resolved => return Ok(resolved),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::SchemaError;
    use crate::hex;
    use crate::value::Value;

    #[test]
    fn type_expressions_parse() {
        let parsed = TypeExpr::parse("map< string , vector<u8> >").unwrap();
        assert_eq!(parsed.name, "map");
        assert_eq!(parsed.args.len(), 2);
        assert_eq!(parsed.args[0].name, "string");
        assert_eq!(parsed.args[1].name, "vector");
        assert_eq!(parsed.args[1].args[0].name, "u8");

        assert!(TypeExpr::parse("vector<").is_err());
        assert!(TypeExpr::parse("vector<u8>>").is_err());
        assert!(TypeExpr::parse("").is_err());
    }

    #[test]
    fn resolves_nested_generics() {
        let registry = Registry::with_primitives();
        let schema = registry.resolve("vector<option<u8>>").unwrap();
        let value = Value::Seq(vec![Value::U8(1), Value::Unit, Value::U8(3)]);
        let env = schema.serialize(&value).unwrap();
        assert_eq!(env.to_bytes(), hex!("030101000103"));
        assert_eq!(env.parse().unwrap(), value);
    }

    #[test]
    fn registered_types_compose_with_builtins() {
        let mut registry = Registry::with_primitives();
        registry.register(
            "Coin",
            crate::record(
                "Coin",
                vec![
                    ("value", crate::u64().to_dynamic()),
                    ("owner", crate::string().to_dynamic()),
                ],
            ),
        );
        let schema = registry.resolve("option<Coin>").unwrap();
        assert_eq!(schema.to_bytes(&Value::Unit).unwrap(), hex!("00"));
    }

    #[test]
    fn tuple_factory_takes_any_arity() {
        let registry = Registry::with_primitives();
        let schema = registry.resolve("tuple<bool, u8, string>").unwrap();
        let value = Value::Seq(vec![
            Value::Bool(true),
            Value::U8(2),
            Value::Text("hi".into()),
        ]);
        let env = schema.serialize(&value).unwrap();
        assert_eq!(env.to_bytes(), hex!("0102026869"));
        assert_eq!(env.parse().unwrap(), value);
    }

    #[test]
    fn aliases_resolve_transitively() {
        let mut registry = Registry::with_primitives();
        registry.alias("Balance", "Amount");
        registry.alias("Amount", "u64");
        let schema = registry.resolve("Balance").unwrap();
        assert_eq!(schema.to_bytes(&Value::U64(1)).unwrap().len(), 8);
    }

    #[test]
    fn alias_cycles_are_rejected() {
        let mut registry = Registry::new();
        registry.alias("A", "B");
        registry.alias("B", "C");
        registry.alias("C", "A");
        let err = registry.resolve("A").unwrap_err();
        let SchemaError::AliasCycle { chain } = err else {
            panic!("expected an alias cycle, got {err:?}");
        };
        assert_eq!(chain, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn arity_is_enforced() {
        let registry = Registry::with_primitives();
        assert!(matches!(
            registry.resolve("vector<u8, u8>"),
            Err(SchemaError::Arity { expected: 1, actual: 2, .. })
        ));
        assert!(matches!(
            registry.resolve("u8<u8>"),
            Err(SchemaError::Arity { expected: 0, .. })
        ));
        assert!(matches!(
            registry.resolve("mystery"),
            Err(SchemaError::UnknownName(_))
        ));
    }
}
