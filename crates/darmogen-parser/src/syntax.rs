//! Lowering of TypeScript modules into the declarations the resolver needs.
//!
//! Only top-level classes and import declarations survive lowering. Class
//! members keep their name, decorator names, static flag and lowered type
//! annotation; everything else in the file is dropped.

use std::path::Path;

use darmogen_core::{Keyword, LiteralKind, TypeNode};
use deno_ast::swc::ast::{
    Callee, Class, ClassMember, ClassProp, Decl, DefaultDecl, Decorator, Expr, ImportSpecifier,
    MemberProp, ModuleDecl, PropName, Stmt, TsEntityName, TsKeywordTypeKind, TsLit, TsType,
    TsTypeOperatorOp, TsTypeRef, TsUnionOrIntersectionType,
};
use deno_ast::{MediaType, ModuleItemRef, ModuleSpecifier, ParseParams};

use crate::error::ParserError;

/// One import declaration: module specifier and the local names it binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub specifier: String,
    pub bindings: Vec<String>,
}

/// A class member that may become a model field
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub decorators: Vec<String>,
    /// `None` when the member has no type annotation
    pub ty: Option<TypeNode>,
    pub is_static: bool,
}

impl PropertyDecl {
    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| d == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub decorators: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub properties: Vec<PropertyDecl>,
}

impl ClassDecl {
    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| d == name)
    }

    /// Heritage names in declaration order: the base class, then interfaces
    pub fn heritage(&self) -> impl Iterator<Item = &str> {
        self.extends
            .iter()
            .chain(self.implements.iter())
            .map(String::as_str)
    }
}

/// Lowered contents of one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedModule {
    pub imports: Vec<ImportDecl>,
    pub classes: Vec<ClassDecl>,
}

/// Parse TypeScript source text. `path` must be absolute; it is only used to
/// label diagnostics.
pub fn parse_module(path: &Path, text: String) -> Result<ParsedModule, ParserError> {
    let specifier = ModuleSpecifier::from_file_path(path).map_err(|_| ParserError::Syntax {
        path: path.to_path_buf(),
        message: "source path is not absolute".to_string(),
    })?;
    let media_type = if path.extension().is_some_and(|ext| ext == "tsx") {
        MediaType::Tsx
    } else {
        MediaType::TypeScript
    };

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: text.into(),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|diagnostic| ParserError::Syntax {
        path: path.to_path_buf(),
        message: diagnostic.to_string(),
    })?;

    let mut module = ParsedModule::default();
    for item in parsed.program_ref().body() {
        match item {
            ModuleItemRef::ModuleDecl(ModuleDecl::Import(import)) => {
                module.imports.push(ImportDecl {
                    specifier: import.src.value.to_string(),
                    bindings: import.specifiers.iter().map(import_binding).collect(),
                });
            }
            ModuleItemRef::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                if let Decl::Class(class) = &export.decl {
                    module
                        .classes
                        .push(lower_class(class.ident.sym.to_string(), &class.class));
                }
            }
            ModuleItemRef::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                if let DefaultDecl::Class(class) = &export.decl {
                    if let Some(ident) = &class.ident {
                        module
                            .classes
                            .push(lower_class(ident.sym.to_string(), &class.class));
                    }
                }
            }
            ModuleItemRef::Stmt(Stmt::Decl(Decl::Class(class))) => {
                module
                    .classes
                    .push(lower_class(class.ident.sym.to_string(), &class.class));
            }
            _ => {}
        }
    }

    tracing::trace!(
        "lowered {}: {} imports, {} classes",
        path.display(),
        module.imports.len(),
        module.classes.len()
    );
    Ok(module)
}

fn import_binding(specifier: &ImportSpecifier) -> String {
    match specifier {
        ImportSpecifier::Named(named) => named.local.sym.to_string(),
        ImportSpecifier::Default(default) => default.local.sym.to_string(),
        ImportSpecifier::Namespace(namespace) => namespace.local.sym.to_string(),
    }
}

fn lower_class(name: String, class: &Class) -> ClassDecl {
    ClassDecl {
        name,
        decorators: class.decorators.iter().filter_map(decorator_name).collect(),
        extends: class.super_class.as_deref().and_then(expr_name),
        implements: class
            .implements
            .iter()
            .filter_map(|heritage| expr_name(&heritage.expr))
            .collect(),
        properties: class
            .body
            .iter()
            .filter_map(|member| match member {
                ClassMember::ClassProp(prop) => lower_property(prop),
                _ => None,
            })
            .collect(),
    }
}

fn lower_property(prop: &ClassProp) -> Option<PropertyDecl> {
    let name = match &prop.key {
        PropName::Ident(ident) => ident.sym.to_string(),
        PropName::Str(s) => s.value.to_string(),
        _ => return None,
    };
    Some(PropertyDecl {
        name,
        decorators: prop.decorators.iter().filter_map(decorator_name).collect(),
        ty: prop.type_ann.as_ref().map(|ann| lower_type(&ann.type_ann)),
        is_static: prop.is_static,
    })
}

/// `@Entity()` and `@Entity` both name `Entity`
fn decorator_name(decorator: &Decorator) -> Option<String> {
    match &*decorator.expr {
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => expr_name(callee),
            _ => None,
        },
        other => expr_name(other),
    }
}

/// Name of an identifier-like expression; `orm.Entity` names `Entity`
fn expr_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.to_string()),
            _ => None,
        },
        Expr::Paren(paren) => expr_name(&paren.expr),
        _ => None,
    }
}

pub fn lower_type(ty: &TsType) -> TypeNode {
    match ty {
        TsType::TsKeywordType(keyword) => TypeNode::Keyword(lower_keyword(keyword.kind)),
        TsType::TsLitType(lit) => TypeNode::Literal(match &lit.lit {
            TsLit::Str(_) | TsLit::Tpl(_) => LiteralKind::String,
            TsLit::Number(_) => LiteralKind::Number,
            TsLit::Bool(_) => LiteralKind::Boolean,
            TsLit::BigInt(_) => LiteralKind::BigInt,
        }),
        TsType::TsTypeRef(reference) => lower_type_ref(reference),
        TsType::TsArrayType(array) => TypeNode::array(lower_type(&array.elem_type)),
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
            TypeNode::Union(union.types.iter().map(|t| lower_type(t)).collect())
        }
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(_)) => {
            TypeNode::Unsupported("IntersectionType".to_string())
        }
        TsType::TsParenthesizedType(paren) => lower_type(&paren.type_ann),
        TsType::TsOptionalType(optional) => lower_type(&optional.type_ann),
        TsType::TsTypeOperator(op) if op.op == TsTypeOperatorOp::ReadOnly => {
            lower_type(&op.type_ann)
        }
        TsType::TsIndexedAccessType(access) => TypeNode::IndexedAccess {
            object: Box::new(lower_type(&access.obj_type)),
            index: Box::new(lower_type(&access.index_type)),
        },
        TsType::TsTypeQuery(_) => TypeNode::Unsupported("TypeQuery".to_string()),
        TsType::TsTypeLit(_) => TypeNode::Unsupported("TypeLiteral".to_string()),
        TsType::TsTupleType(_) => TypeNode::Unsupported("TupleType".to_string()),
        TsType::TsFnOrConstructorType(_) => TypeNode::Unsupported("FunctionType".to_string()),
        _ => TypeNode::Unsupported("UnknownType".to_string()),
    }
}

fn lower_keyword(kind: TsKeywordTypeKind) -> Keyword {
    match kind {
        TsKeywordTypeKind::TsStringKeyword => Keyword::String,
        TsKeywordTypeKind::TsNumberKeyword => Keyword::Number,
        TsKeywordTypeKind::TsBooleanKeyword => Keyword::Boolean,
        TsKeywordTypeKind::TsBigIntKeyword => Keyword::BigInt,
        TsKeywordTypeKind::TsUnknownKeyword => Keyword::Unknown,
        TsKeywordTypeKind::TsObjectKeyword => Keyword::Object,
        TsKeywordTypeKind::TsSymbolKeyword => Keyword::Symbol,
        TsKeywordTypeKind::TsVoidKeyword => Keyword::Void,
        TsKeywordTypeKind::TsUndefinedKeyword => Keyword::Undefined,
        TsKeywordTypeKind::TsNullKeyword => Keyword::Null,
        TsKeywordTypeKind::TsNeverKeyword => Keyword::Never,
        _ => Keyword::Any,
    }
}

/// `Array<T>` becomes an array node, `Record<K, V>` and `Map<K, V>` a map node.
fn lower_type_ref(reference: &TsTypeRef) -> TypeNode {
    let name = entity_name(&reference.type_name);
    let mut args: Vec<TypeNode> = reference
        .type_params
        .as_ref()
        .map(|params| params.params.iter().map(|t| lower_type(t)).collect())
        .unwrap_or_default();

    match (name.as_str(), args.len()) {
        ("Array" | "ReadonlyArray", 1) => TypeNode::array(args.remove(0)),
        ("Record" | "Map", 2) => {
            let value = args.remove(1);
            let key = args.remove(0);
            TypeNode::Map {
                key: Box::new(key),
                value: Box::new(value),
            }
        }
        _ => TypeNode::Reference { name, args },
    }
}

fn entity_name(name: &TsEntityName) -> String {
    match name {
        TsEntityName::Ident(ident) => ident.sym.to_string(),
        TsEntityName::TsQualifiedName(qualified) => {
            format!("{}.{}", entity_name(&qualified.left), qualified.right.sym)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ParsedModule {
        parse_module(Path::new("/virtual/test.entity.ts"), text.to_string())
            .expect("source should parse")
    }

    fn property<'a>(class: &'a ClassDecl, name: &str) -> &'a PropertyDecl {
        class
            .properties
            .iter()
            .find(|p| p.name == name)
            .expect("property should exist")
    }

    #[test]
    fn test_lowers_imports_and_classes() {
        let module = parse(
            r#"
            import { Entity, Column } from "typeorm";
            import Base, * as shared from "../shared/base";

            @Entity()
            export class User extends Base implements Auditable, Named {
              @Column()
              name: string;

              static table = "users";
            }

            class Helper {}
            "#,
        );

        assert_eq!(
            module.imports,
            vec![
                ImportDecl {
                    specifier: "typeorm".to_string(),
                    bindings: vec!["Entity".to_string(), "Column".to_string()],
                },
                ImportDecl {
                    specifier: "../shared/base".to_string(),
                    bindings: vec!["Base".to_string(), "shared".to_string()],
                },
            ]
        );

        let names: Vec<_> = module.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Helper"]);

        let user = &module.classes[0];
        assert!(user.has_decorator("Entity"));
        assert_eq!(
            user.heritage().collect::<Vec<_>>(),
            vec!["Base", "Auditable", "Named"]
        );
        assert!(property(user, "table").is_static);
        assert_eq!(property(user, "name").decorators, vec!["Column".to_string()]);
    }

    #[test]
    fn test_lowers_property_types() {
        let module = parse(
            r#"
            export class Sample {
              a: string | null;
              b: Post[];
              c: Array<number>;
              d: Record<string, unknown>;
              e: "draft" | "published";
              f: (typeof ROLES)[number];
              g;
              h: Date;
              i: orm.Thing;
            }
            "#,
        );
        let class = &module.classes[0];

        assert_eq!(
            property(class, "a").ty,
            Some(TypeNode::Union(vec![
                TypeNode::Keyword(Keyword::String),
                TypeNode::Keyword(Keyword::Null),
            ]))
        );
        assert_eq!(
            property(class, "b").ty,
            Some(TypeNode::array(TypeNode::reference("Post")))
        );
        assert_eq!(
            property(class, "c").ty,
            Some(TypeNode::array(TypeNode::Keyword(Keyword::Number)))
        );
        assert_eq!(
            property(class, "d").ty,
            Some(TypeNode::Map {
                key: Box::new(TypeNode::Keyword(Keyword::String)),
                value: Box::new(TypeNode::Keyword(Keyword::Unknown)),
            })
        );
        assert_eq!(
            property(class, "e").ty.as_ref().map(TypeNode::collapse),
            Some(TypeNode::Keyword(Keyword::String))
        );
        assert_eq!(
            property(class, "f").ty,
            Some(TypeNode::IndexedAccess {
                object: Box::new(TypeNode::Unsupported("TypeQuery".to_string())),
                index: Box::new(TypeNode::Keyword(Keyword::Number)),
            })
        );
        assert_eq!(property(class, "g").ty, None);
        assert_eq!(property(class, "h").ty, Some(TypeNode::reference("Date")));
        assert_eq!(property(class, "i").ty, Some(TypeNode::reference("orm.Thing")));
    }

    #[test]
    fn test_default_export_class() {
        let module = parse("@Entity()\nexport default class Tag {}\n");
        assert_eq!(module.classes.len(), 1);
        assert_eq!(module.classes[0].name, "Tag");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = parse_module(
            Path::new("/virtual/broken.entity.ts"),
            "export class {".to_string(),
        );
        assert!(matches!(result, Err(ParserError::Syntax { .. })));
    }
}
