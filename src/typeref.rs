//! Type expressions - the declared return, field, and parameter types.
//!
//! Types are written the way they appear in a method signature:
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `string`, `int64`, `date-time`, ... | inline scalar |
//! | `List<T>`, `Set<T>`, `Vec<T>`, `T[]` | array of `T` |
//! | `Map<K, V>`, `Map<V>` | object whose values are `V` |
//! | `Optional<T>`, `Option<T>` | same as `T` |
//! | `void` | no content |
//! | `any`, `object` | untyped |
//! | anything else | named data shape |

use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Scalar wire types, rendered inline as `type` + `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Long,
    Float,
    Double,
    Number,
    String,
    Boolean,
    Byte,
    Binary,
    Date,
    DateTime,
    Password,
    Uuid,
}

impl ScalarType {
    /// Look up a scalar by any of its accepted spellings, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name.to_ascii_lowercase().as_str() {
            "int" | "integer" | "int32" | "i32" | "short" | "i16" | "i8" | "u8" | "u16" => {
                ScalarType::Integer
            }
            "long" | "int64" | "i64" | "u32" | "u64" | "biginteger" => ScalarType::Long,
            "float" | "f32" => ScalarType::Float,
            "double" | "f64" => ScalarType::Double,
            "number" | "bigdecimal" => ScalarType::Number,
            "string" | "str" | "char" | "character" => ScalarType::String,
            "boolean" | "bool" => ScalarType::Boolean,
            "byte" => ScalarType::Byte,
            "binary" => ScalarType::Binary,
            "date" | "localdate" => ScalarType::Date,
            "date-time" | "datetime" | "instant" | "localdatetime" | "offsetdatetime"
            | "zoneddatetime" => ScalarType::DateTime,
            "password" => ScalarType::Password,
            "uuid" => ScalarType::Uuid,
            _ => return None,
        };
        Some(scalar)
    }

    /// The `type` and optional `format` for this scalar.
    pub fn type_and_format(&self) -> (&'static str, Option<&'static str>) {
        match self {
            ScalarType::Integer => ("integer", Some("int32")),
            ScalarType::Long => ("integer", Some("int64")),
            ScalarType::Float => ("number", Some("float")),
            ScalarType::Double => ("number", Some("double")),
            ScalarType::Number => ("number", None),
            ScalarType::String => ("string", None),
            ScalarType::Boolean => ("boolean", None),
            ScalarType::Byte => ("string", Some("byte")),
            ScalarType::Binary => ("string", Some("binary")),
            ScalarType::Date => ("string", Some("date")),
            ScalarType::DateTime => ("string", Some("date-time")),
            ScalarType::Password => ("string", Some("password")),
            ScalarType::Uuid => ("string", Some("uuid")),
        }
    }
}

/// Flavor of a sequence container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Set,
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Explicit "no content".
    Void,
    /// Opaque framework response; carries no schema.
    Any,
    /// Untyped object value.
    Object,
    Scalar(ScalarType),
    Array {
        kind: ContainerKind,
        element: Box<TypeRef>,
    },
    Map(Box<TypeRef>),
    /// A complex type, by its declared (possibly qualified) name.
    Named(String),
}

impl TypeRef {
    /// Parse a type expression.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if the expression is empty, malformed, or applies
    /// type arguments to something that is not a container.
    pub fn parse(expr: &str) -> Result<Self, TypeError> {
        if expr.trim().is_empty() {
            return Err(TypeError::Empty);
        }
        let mut parser = Parser { expr, pos: 0 };
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(parsed),
            Some(found) => Err(parser.unexpected(found)),
        }
    }

    /// True for types that produce no response body.
    pub fn is_no_content(&self) -> bool {
        matches!(self, TypeRef::Void | TypeRef::Any)
    }

    /// True for sequence and map containers.
    pub fn is_container(&self) -> bool {
        matches!(self, TypeRef::Array { .. } | TypeRef::Map(_))
    }

    /// Wrap this type in a container named by an operation's response
    /// container attribute (`List`, `Set`, `Array`, `Map`).
    ///
    /// Returns `None` when the container name is not recognized.
    pub fn wrap_in(self, container: &str) -> Option<Self> {
        let wrapped = match container.trim().to_ascii_lowercase().as_str() {
            "list" | "array" => TypeRef::Array {
                kind: ContainerKind::List,
                element: Box::new(self),
            },
            "set" => TypeRef::Array {
                kind: ContainerKind::Set,
                element: Box::new(self),
            },
            "map" => TypeRef::Map(Box::new(self)),
            _ => return None,
        };
        Some(wrapped)
    }

    /// Names of every complex type mentioned in this expression.
    pub fn named_types(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_named(&mut names);
        names
    }

    fn collect_named<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeRef::Named(name) => names.push(name),
            TypeRef::Array { element, .. } => element.collect_named(names),
            TypeRef::Map(value) => value.collect_named(names),
            TypeRef::Void | TypeRef::Any | TypeRef::Object | TypeRef::Scalar(_) => {}
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Any => f.write_str("any"),
            TypeRef::Object => f.write_str("object"),
            TypeRef::Scalar(scalar) => {
                let (ty, format) = scalar.type_and_format();
                f.write_str(format.unwrap_or(ty))
            }
            TypeRef::Array {
                kind: ContainerKind::List,
                element,
            } => write!(f, "List<{}>", element),
            TypeRef::Array {
                kind: ContainerKind::Set,
                element,
            } => write!(f, "Set<{}>", element),
            TypeRef::Map(value) => write!(f, "Map<string, {}>", value),
            TypeRef::Named(name) => f.write_str(name),
        }
    }
}

/// Last segment of a qualified name (`com.acme.Dto`, `api::Dto`, `Outer$Dto`).
pub fn simple_name(name: &str) -> &str {
    name.rsplit(|c| matches!(c, '.' | ':' | '$'))
        .next()
        .unwrap_or(name)
}

const LIST_CONTAINERS: &[&str] = &[
    "List",
    "ArrayList",
    "LinkedList",
    "Collection",
    "Iterable",
    "Array",
    "Vec",
    "VecDeque",
    "Seq",
];
const SET_CONTAINERS: &[&str] = &[
    "Set",
    "HashSet",
    "TreeSet",
    "SortedSet",
    "LinkedHashSet",
    "BTreeSet",
];
const MAP_CONTAINERS: &[&str] = &["Map", "HashMap", "TreeMap", "LinkedHashMap", "BTreeMap"];
const OPTIONAL_WRAPPERS: &[&str] = &["Optional", "Option"];

struct Parser<'a> {
    expr: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.expr[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn unexpected(&self, found: char) -> TypeError {
        TypeError::UnexpectedChar {
            expr: self.expr.to_string(),
            found,
            offset: self.pos,
        }
    }

    fn unexpected_end(&self) -> TypeError {
        TypeError::UnexpectedEnd {
            expr: self.expr.to_string(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.unexpected_end()),
        }
    }

    // type := ident [ '<' type (',' type)* '>' ] ( '[' ']' )*
    fn parse_type(&mut self) -> Result<TypeRef, TypeError> {
        let name = self.parse_ident()?;

        self.skip_whitespace();
        let args = if self.peek() == Some('<') {
            self.bump();
            self.parse_args()?
        } else {
            Vec::new()
        };

        let mut parsed = build(name, args)?;

        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                break;
            }
            self.bump();
            self.expect(']')?;
            parsed = TypeRef::Array {
                kind: ContainerKind::List,
                element: Box::new(parsed),
            };
        }

        Ok(parsed)
    }

    fn parse_args(&mut self) -> Result<Vec<TypeRef>, TypeError> {
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('>') => return Ok(args),
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.unexpected(c));
                }
                None => return Err(self.unexpected_end()),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<&'a str, TypeError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.unexpected_end()),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ':' | '-'))
        {
            self.bump();
        }
        Ok(&self.expr[start..self.pos])
    }
}

fn build(name: &str, mut args: Vec<TypeRef>) -> Result<TypeRef, TypeError> {
    let simple = simple_name(name);

    if LIST_CONTAINERS.contains(&simple) || SET_CONTAINERS.contains(&simple) {
        if args.len() != 1 {
            return Err(arity(simple, "1", args.len()));
        }
        let kind = if SET_CONTAINERS.contains(&simple) {
            ContainerKind::Set
        } else {
            ContainerKind::List
        };
        return Ok(TypeRef::Array {
            kind,
            element: Box::new(args.remove(0)),
        });
    }

    if MAP_CONTAINERS.contains(&simple) {
        // Keys are always strings on the wire; only the value type matters.
        return match args.len() {
            1 | 2 => Ok(TypeRef::Map(Box::new(args.remove(args.len() - 1)))),
            found => Err(arity(simple, "1 or 2", found)),
        };
    }

    if OPTIONAL_WRAPPERS.contains(&simple) {
        if args.len() != 1 {
            return Err(arity(simple, "1", args.len()));
        }
        return Ok(args.remove(0));
    }

    if !args.is_empty() {
        return Err(TypeError::UnsupportedGeneric {
            name: name.to_string(),
        });
    }

    let parsed = match simple.to_ascii_lowercase().as_str() {
        "void" | "unit" => TypeRef::Void,
        "any" => TypeRef::Any,
        "object" => TypeRef::Object,
        _ => match ScalarType::from_name(simple) {
            Some(scalar) => TypeRef::Scalar(scalar),
            None => TypeRef::Named(name.to_string()),
        },
    };
    Ok(parsed)
}

fn arity(name: &str, expected: &'static str, found: usize) -> TypeError {
    TypeError::ContainerArity {
        name: name.to_string(),
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(name.to_string())
    }

    fn list_of(element: TypeRef) -> TypeRef {
        TypeRef::Array {
            kind: ContainerKind::List,
            element: Box::new(element),
        }
    }

    #[test]
    fn parse_scalars() {
        assert_eq!(
            TypeRef::parse("String").unwrap(),
            TypeRef::Scalar(ScalarType::String)
        );
        assert_eq!(
            TypeRef::parse("int64").unwrap(),
            TypeRef::Scalar(ScalarType::Long)
        );
        assert_eq!(
            TypeRef::parse("date-time").unwrap(),
            TypeRef::Scalar(ScalarType::DateTime)
        );
    }

    #[test]
    fn parse_void_and_any() {
        assert_eq!(TypeRef::parse("void").unwrap(), TypeRef::Void);
        assert_eq!(TypeRef::parse("any").unwrap(), TypeRef::Any);
        assert!(TypeRef::parse("any").unwrap().is_no_content());
        assert!(TypeRef::parse("void").unwrap().is_no_content());
    }

    #[test]
    fn parse_object_has_content() {
        let parsed = TypeRef::parse("Object").unwrap();
        assert_eq!(parsed, TypeRef::Object);
        assert!(!parsed.is_no_content());
    }

    #[test]
    fn parse_named() {
        assert_eq!(TypeRef::parse("ResponseDto").unwrap(), named("ResponseDto"));
        assert_eq!(
            TypeRef::parse("com.acme.ResponseDto").unwrap(),
            named("com.acme.ResponseDto")
        );
    }

    #[test]
    fn parse_list_containers() {
        let expected = list_of(named("ResponseDto"));
        assert_eq!(TypeRef::parse("List<ResponseDto>").unwrap(), expected);
        assert_eq!(TypeRef::parse("java.util.ArrayList<ResponseDto>").unwrap(), expected);
        assert_eq!(TypeRef::parse("ResponseDto[]").unwrap(), expected);
        assert_eq!(TypeRef::parse(" Vec < ResponseDto > ").unwrap(), expected);
    }

    #[test]
    fn parse_set_container() {
        assert_eq!(
            TypeRef::parse("Set<string>").unwrap(),
            TypeRef::Array {
                kind: ContainerKind::Set,
                element: Box::new(TypeRef::Scalar(ScalarType::String)),
            }
        );
    }

    #[test]
    fn parse_nested_containers() {
        assert_eq!(
            TypeRef::parse("List<List<Dto>>").unwrap(),
            list_of(list_of(named("Dto")))
        );
        assert_eq!(TypeRef::parse("Dto[][]").unwrap(), list_of(list_of(named("Dto"))));
    }

    #[test]
    fn parse_map_keeps_value_type() {
        assert_eq!(
            TypeRef::parse("Map<String, Dto>").unwrap(),
            TypeRef::Map(Box::new(named("Dto")))
        );
        assert_eq!(
            TypeRef::parse("Map<Dto>").unwrap(),
            TypeRef::Map(Box::new(named("Dto")))
        );
    }

    #[test]
    fn parse_optional_unwraps() {
        assert_eq!(TypeRef::parse("Optional<Dto>").unwrap(), named("Dto"));
        assert_eq!(
            TypeRef::parse("Option<Vec<i32>>").unwrap(),
            list_of(TypeRef::Scalar(ScalarType::Integer))
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(TypeRef::parse("  "), Err(TypeError::Empty));
        assert!(matches!(
            TypeRef::parse("List<"),
            Err(TypeError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            TypeRef::parse("List<Dto"),
            Err(TypeError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            TypeRef::parse("Dto>"),
            Err(TypeError::UnexpectedChar { found: '>', offset: 3, .. })
        ));
        assert!(matches!(
            TypeRef::parse("Map<>"),
            Err(TypeError::UnexpectedChar { found: '>', .. })
        ));
        assert!(matches!(
            TypeRef::parse("Page<Dto>"),
            Err(TypeError::UnsupportedGeneric { name }) if name == "Page"
        ));
        assert!(matches!(
            TypeRef::parse("List<A, B>"),
            Err(TypeError::ContainerArity { found: 2, .. })
        ));
    }

    #[test]
    fn wrap_in_response_container() {
        let dto = named("Dto");
        assert_eq!(dto.clone().wrap_in("List"), Some(list_of(dto.clone())));
        assert_eq!(
            dto.clone().wrap_in("map"),
            Some(TypeRef::Map(Box::new(dto.clone())))
        );
        assert_eq!(dto.wrap_in("Stream"), None);
    }

    #[test]
    fn named_types_walks_containers() {
        let parsed = TypeRef::parse("Map<String, List<Dto>>").unwrap();
        assert_eq!(parsed.named_types(), vec!["Dto"]);
        assert!(TypeRef::parse("List<int>").unwrap().named_types().is_empty());
    }

    #[test]
    fn simple_name_strips_qualifiers() {
        assert_eq!(simple_name("com.acme.Dto"), "Dto");
        assert_eq!(simple_name("api::models::Dto"), "Dto");
        assert_eq!(simple_name("Outer$Inner"), "Inner");
        assert_eq!(simple_name("Dto"), "Dto");
    }
}
