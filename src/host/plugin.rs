//! Plugin registry and argument maps.
//!
//! Functions are registered with a textual argument schema such as
//! `clip:vnode;clip2:vnode;c:int:opt;`. [`Plugin::invoke`] checks an
//! [`ArgMap`] against that schema before handing it to the function's
//! constructor.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::node::Node;

/// Errors raised by registration and invocation.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Malformed argument schema.
    #[error("invalid signature `{signature}`: {reason}")]
    InvalidSignature { signature: String, reason: String },
    /// Name registered twice.
    #[error("function {0} is already registered")]
    DuplicateFunction(String),
    /// No function by that name.
    #[error("no function named {0}")]
    UnknownFunction(String),
    /// A required argument is absent.
    #[error("{function}: argument {arg} is required")]
    MissingArgument { function: String, arg: String },
    /// An argument the schema does not list.
    #[error("{function}: unexpected argument {arg}")]
    UnexpectedArgument { function: String, arg: String },
    /// Argument of the wrong type.
    #[error("argument {arg} must be of type {expected}")]
    WrongType { arg: String, expected: ArgType },
    /// The filter rejected its inputs.
    #[error(transparent)]
    Filter(#[from] crate::filter::FilterError),
}

/// Argument types understood by the schema parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// `vnode`: a clip.
    Node,
    /// `int`: a 64-bit integer.
    Int,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Node => f.write_str("vnode"),
            ArgType::Int => f.write_str("int"),
        }
    }
}

/// One `name:type[:opt]` entry of a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    /// Argument name.
    pub name: String,
    /// Argument type.
    pub ty: ArgType,
    /// Whether the argument may be omitted.
    pub optional: bool,
}

/// Parsed argument schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    args: Vec<ArgSpec>,
}

impl Signature {
    /// Parses `name:type[:opt];` entries. Empty entries are ignored.
    pub fn parse(signature: &str) -> Result<Self, PluginError> {
        let invalid = |reason: String| PluginError::InvalidSignature {
            signature: signature.to_string(),
            reason,
        };

        let mut args: Vec<ArgSpec> = Vec::new();
        for entry in signature.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':');
            let name = parts.next().unwrap_or_default();
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid(format!("bad argument name in `{entry}`")));
            }
            let ty = match parts.next() {
                Some("vnode") => ArgType::Node,
                Some("int") => ArgType::Int,
                Some(other) => return Err(invalid(format!("unknown type `{other}`"))),
                None => return Err(invalid(format!("missing type in `{entry}`"))),
            };
            let optional = match parts.next() {
                None => false,
                Some("opt") => true,
                Some(other) => return Err(invalid(format!("unknown flag `{other}`"))),
            };
            if parts.next().is_some() {
                return Err(invalid(format!("trailing fields in `{entry}`")));
            }
            if args.iter().any(|a| a.name == name) {
                return Err(invalid(format!("duplicate argument `{name}`")));
            }
            args.push(ArgSpec {
                name: name.to_string(),
                ty,
                optional,
            });
        }

        Ok(Self { args })
    }

    /// Entries in declaration order.
    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arg in &self.args {
            write!(f, "{}:{}", arg.name, arg.ty)?;
            if arg.optional {
                f.write_str(":opt")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

/// A value stored in an [`ArgMap`].
#[derive(Clone)]
pub enum Value {
    /// A clip.
    Node(Node),
    /// An integer.
    Int(i64),
}

impl Value {
    fn ty(&self) -> ArgType {
        match self {
            Value::Node(_) => ArgType::Node,
            Value::Int(_) => ArgType::Int,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Node(node) => write!(f, "Node({})", node.name()),
            Value::Int(v) => write!(f, "Int({v})"),
        }
    }
}

/// Named arguments passed to a plugin function.
#[derive(Debug, Clone, Default)]
pub struct ArgMap {
    values: BTreeMap<String, Value>,
}

impl ArgMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a clip under `key`.
    pub fn set_node(&mut self, key: &str, node: Node) -> &mut Self {
        self.values.insert(key.to_string(), Value::Node(node));
        self
    }

    /// Stores an integer under `key`.
    pub fn set_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.values.insert(key.to_string(), Value::Int(value));
        self
    }

    /// Argument names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns a new handle to the node stored under `key`.
    pub fn get_node(&self, key: &str) -> Result<Option<Node>, PluginError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Node(node)) => Ok(Some(Arc::clone(node))),
            Some(_) => Err(PluginError::WrongType {
                arg: key.to_string(),
                expected: ArgType::Node,
            }),
        }
    }

    /// Integer under `key`, if present.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, PluginError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(*v)),
            Some(_) => Err(PluginError::WrongType {
                arg: key.to_string(),
                expected: ArgType::Int,
            }),
        }
    }

    /// Integer under `key`, clamped into the `i32` range.
    pub fn get_int_saturated(&self, key: &str) -> Result<Option<i32>, PluginError> {
        Ok(self
            .get_int(key)?
            .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
    }
}

/// Constructor invoked once the arguments match the signature.
pub type CreateFn = fn(&ArgMap) -> Result<Node, PluginError>;

/// A registered plugin function.
#[derive(Clone)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Argument schema.
    pub args: Signature,
    /// Return schema.
    pub returns: Signature,
    create: CreateFn,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("args", &self.args.to_string())
            .field("returns", &self.returns.to_string())
            .finish()
    }
}

/// Identification of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Reverse-domain identifier, unique per plugin.
    pub identifier: String,
    /// Short namespace functions are called through.
    pub namespace: String,
    /// Human-readable name.
    pub name: String,
    /// Major and minor version.
    pub version: (u32, u32),
}

/// A named collection of filter constructors.
#[derive(Debug, Clone)]
pub struct Plugin {
    metadata: PluginMetadata,
    functions: Vec<Function>,
}

impl Plugin {
    /// Plugin with no functions.
    pub fn new(metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            functions: Vec::new(),
        }
    }

    /// Identification of the plugin.
    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Registers `name` with its argument and return schemas.
    pub fn register_function(
        &mut self,
        name: &str,
        args: &str,
        returns: &str,
        create: CreateFn,
    ) -> Result<(), PluginError> {
        if self.function(name).is_some() {
            return Err(PluginError::DuplicateFunction(name.to_string()));
        }
        self.functions.push(Function {
            name: name.to_string(),
            args: Signature::parse(args)?,
            returns: Signature::parse(returns)?,
            create,
        });
        tracing::debug!(
            plugin = %self.metadata.identifier,
            function = name,
            "Registered function"
        );
        Ok(())
    }

    /// Looks up a registered function.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Validates `args` against the function's signature and constructs it.
    pub fn invoke(&self, name: &str, args: &ArgMap) -> Result<Node, PluginError> {
        let function = self
            .function(name)
            .ok_or_else(|| PluginError::UnknownFunction(name.to_string()))?;

        if let Some(extra) = args.keys().find(|k| function.args.get(k).is_none()) {
            return Err(PluginError::UnexpectedArgument {
                function: name.to_string(),
                arg: extra.to_string(),
            });
        }

        for spec in function.args.args() {
            match args.values.get(&spec.name) {
                None if spec.optional => {}
                None => {
                    return Err(PluginError::MissingArgument {
                        function: name.to_string(),
                        arg: spec.name.clone(),
                    })
                }
                Some(value) if value.ty() != spec.ty => {
                    return Err(PluginError::WrongType {
                        arg: spec.name.clone(),
                        expected: spec.ty,
                    })
                }
                Some(_) => {}
            }
        }

        (function.create)(args)
    }
}
