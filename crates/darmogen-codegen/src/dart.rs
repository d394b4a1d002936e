//! Dart model class emission.
//!
//! Each entity becomes one class extending the configured base class, which
//! owns the identity field. The class has a named-parameter constructor and a
//! `toJson`/`fromJson` pair whose per-field conversions mirror each other:
//! dates travel as ISO-8601 strings, entities as nested objects, arrays of
//! entities as arrays of nested objects, maps of entities or dates as maps
//! of the converted values.

use std::fmt::Write;

use darmogen_core::naming::to_camel_case;
use darmogen_core::{Field, GeneratorConfig};
use tracing::debug;

use crate::error::CodegenError;
use crate::import_tracker::{HeaderAssembler, ImportTracker};
use crate::target::{DartEntity, EntityIndex};
use crate::type_mapper::{FieldShape, TypeMapper};

/// Every entity of a run, ready to be emitted in any order
#[derive(Debug, Clone)]
pub struct DartModel {
    index: EntityIndex,
    config: GeneratorConfig,
    indent_size: usize,
}

impl DartModel {
    pub fn new(index: EntityIndex, config: GeneratorConfig) -> Self {
        Self {
            index,
            config,
            indent_size: 2,
        }
    }

    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(level * self.indent_size)
    }

    /// Full file content for entity `entity`: headers, then the class.
    pub fn emit(&self, entity: usize) -> Result<String, CodegenError> {
        let target = self.index.get(entity).ok_or_else(|| {
            CodegenError::Generation(format!("no entity at index {}", entity))
        })?;

        let mut tracker = ImportTracker::new(entity);
        let class = self.emit_class(target, &mut tracker)?;
        let headers = HeaderAssembler::new(
            &self.index,
            &self.config.out,
            &self.config.imports,
            &self.config.headers,
        )
        .assemble(entity, &tracker);

        let mut output = String::new();
        if !headers.is_empty() {
            writeln!(output, "{}", headers.join("\n"))?;
            writeln!(output)?;
        }
        output.push_str(&class);

        debug!(
            "Emitted {} ({} header lines)",
            target.class_name,
            headers.len()
        );
        Ok(output)
    }

    fn emit_class(
        &self,
        entity: &DartEntity,
        tracker: &mut ImportTracker,
    ) -> Result<String, CodegenError> {
        let mapper = TypeMapper::new(&self.index);
        let identity = &self.config.identity_field;
        let class = &entity.class_name;
        let fields: Vec<&Field> = entity
            .model
            .fields
            .iter()
            .filter(|f| &f.name != identity)
            .collect();

        let mut output = String::new();
        writeln!(output, "class {} extends {} {{", class, self.config.base_class)?;
        for field in &fields {
            let ty = mapper.map_descriptor(&field.ty, tracker);
            writeln!(output, "{}{} {};", self.indent(1), ty, field.name)?;
        }
        if !fields.is_empty() {
            writeln!(output)?;
        }

        writeln!(output, "{}{}({{", self.indent(1), class)?;
        writeln!(output, "{}String {},", self.indent(2), identity)?;
        for field in &fields {
            writeln!(output, "{}this.{},", self.indent(2), field.name)?;
        }
        writeln!(output, "{}}}) : super({});", self.indent(1), identity)?;
        writeln!(output)?;

        writeln!(output, "{}@override", self.indent(1))?;
        writeln!(output, "{}Map<String, dynamic> toJson() => {{", self.indent(1))?;
        writeln!(output, "{}'{}': {},", self.indent(2), identity, identity)?;
        for field in &fields {
            let value = self.serializer(&mapper, field, tracker);
            writeln!(output, "{}'{}': {},", self.indent(2), field.name, value)?;
        }
        writeln!(output, "{}}};", self.indent(1))?;
        writeln!(output)?;

        writeln!(
            output,
            "{}factory {}.fromJson(Map<String, dynamic> json) {{",
            self.indent(1),
            class
        )?;
        writeln!(output, "{}if (json == null) return null;", self.indent(2))?;
        writeln!(output, "{}return {}(", self.indent(2), class)?;
        writeln!(output, "{}{}: json['{}'],", self.indent(3), identity, identity)?;
        for field in &fields {
            let value = self.deserializer(&mapper, field, tracker);
            writeln!(output, "{}{}: {},", self.indent(3), field.name, value)?;
        }
        writeln!(output, "{});", self.indent(2))?;
        writeln!(output, "{}}}", self.indent(1))?;
        writeln!(output, "}}")?;

        Ok(output)
    }

    /// Expression producing the JSON value of `field`
    fn serializer(&self, mapper: &TypeMapper<'_>, field: &Field, tracker: &mut ImportTracker) -> String {
        let name = &field.name;
        match mapper.shape(&field.ty.node) {
            FieldShape::Date => format!("{}?.toIso8601String()", name),
            FieldShape::Entity(entity) => {
                tracker.record(entity);
                format!("{}?.toJson()", name)
            }
            FieldShape::List(element) => {
                let element = element.collapse();
                match mapper.shape(&element) {
                    FieldShape::Entity(entity) => {
                        tracker.record(entity);
                        let item = to_camel_case(&self.index[entity].name);
                        format!("{}?.map(({}) => {}.toJson())?.toList()", name, item, item)
                    }
                    FieldShape::Date => {
                        format!("{}?.map((date) => date?.toIso8601String())?.toList()", name)
                    }
                    _ => name.clone(),
                }
            }
            FieldShape::Map(value) => {
                let value = value.collapse();
                match mapper.shape(&value) {
                    FieldShape::Entity(entity) => {
                        tracker.record(entity);
                        format!("{}?.map((key, value) => MapEntry(key, value?.toJson()))", name)
                    }
                    FieldShape::Date => format!(
                        "{}?.map((key, date) => MapEntry(key, date?.toIso8601String()))",
                        name
                    ),
                    _ => name.clone(),
                }
            }
            FieldShape::Plain => name.clone(),
        }
    }

    /// Expression rebuilding `field` from `json`
    fn deserializer(&self, mapper: &TypeMapper<'_>, field: &Field, tracker: &mut ImportTracker) -> String {
        let key = format!("json['{}']", field.name);
        match mapper.shape(&field.ty.node) {
            FieldShape::Date => format!("DateTime.tryParse({} ?? '')", key),
            FieldShape::Entity(entity) => {
                tracker.record(entity);
                format!("{}.fromJson({})", self.index[entity].class_name, key)
            }
            FieldShape::List(element) => {
                let element = element.collapse();
                match mapper.shape(&element) {
                    FieldShape::Entity(entity) => {
                        tracker.record(entity);
                        format!(
                            "({} as List<dynamic>)?.map((data) => {}.fromJson(data))?.toList()",
                            key, self.index[entity].class_name
                        )
                    }
                    FieldShape::Date => format!(
                        "({} as List<dynamic>)?.map((data) => DateTime.tryParse(data ?? ''))?.toList()",
                        key
                    ),
                    _ => format!(
                        "({} as List<dynamic>)?.cast<{}>()",
                        key,
                        mapper.map_type(&element, tracker)
                    ),
                }
            }
            FieldShape::Map(value) => {
                let value = value.collapse();
                match mapper.shape(&value) {
                    FieldShape::Entity(entity) => {
                        tracker.record(entity);
                        format!(
                            "({} as Map<String, dynamic>)?.map((key, data) => MapEntry(key, {}.fromJson(data)))",
                            key, self.index[entity].class_name
                        )
                    }
                    FieldShape::Date => format!(
                        "({} as Map<String, dynamic>)?.map((key, data) => MapEntry(key, DateTime.tryParse(data ?? '')))",
                        key
                    ),
                    _ => format!(
                        "({} as Map<String, dynamic>)?.cast<String, {}>()",
                        key,
                        mapper.map_type(&value, tracker)
                    ),
                }
            }
            FieldShape::Plain => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darmogen_core::{EntityModel, Keyword, LiteralKind, TypeDescriptor, TypeNode};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn field(name: &str, node: TypeNode) -> Field {
        Field::new(name, TypeDescriptor::local(node))
    }

    fn entity(name: &str, source: &str, target: &str, fields: Vec<Field>) -> DartEntity {
        DartEntity {
            name: name.to_string(),
            class_name: name.to_string(),
            source_path: PathBuf::from(source),
            target_file: PathBuf::from(target),
            model: EntityModel {
                name: name.to_string(),
                fields,
            },
        }
    }

    fn comment_model() -> DartModel {
        let post = Field::new(
            "post",
            TypeDescriptor::local(TypeNode::reference("Post")).with_origin(
                PathBuf::from("/src/post/post.entity.ts"),
                PathBuf::from("post/post.entity.ts"),
            ),
        );
        let comment = entity(
            "Comment",
            "post/comment.entity.ts",
            "/out/post/comment.dart",
            vec![
                field("text", TypeNode::Keyword(Keyword::String)),
                post,
                field("parent", TypeNode::reference("Comment")),
                field("replies", TypeNode::array(TypeNode::reference("Comment"))),
                field("id", TypeNode::Keyword(Keyword::String)),
                field("createdAt", TypeNode::reference("Date")),
                field("tags", TypeNode::array(TypeNode::Keyword(Keyword::String))),
                field(
                    "meta",
                    TypeNode::Map {
                        key: Box::new(TypeNode::Keyword(Keyword::String)),
                        value: Box::new(TypeNode::Keyword(Keyword::Unknown)),
                    },
                ),
            ],
        );
        let post = entity("Post", "post/post.entity.ts", "/out/post/post.dart", vec![]);
        DartModel::new(
            EntityIndex::new(vec![comment, post]),
            GeneratorConfig::new("/out"),
        )
    }

    #[test]
    fn test_emit_full_class() -> Result<(), CodegenError> {
        let expected = r#"import 'post.dart';

class Comment extends Model {
  String text;
  Post post;
  Comment parent;
  List<Comment> replies;
  DateTime createdAt;
  List<String> tags;
  Map<String, dynamic> meta;

  Comment({
    String id,
    this.text,
    this.post,
    this.parent,
    this.replies,
    this.createdAt,
    this.tags,
    this.meta,
  }) : super(id);

  @override
  Map<String, dynamic> toJson() => {
    'id': id,
    'text': text,
    'post': post?.toJson(),
    'parent': parent?.toJson(),
    'replies': replies?.map((comment) => comment.toJson())?.toList(),
    'createdAt': createdAt?.toIso8601String(),
    'tags': tags,
    'meta': meta,
  };

  factory Comment.fromJson(Map<String, dynamic> json) {
    if (json == null) return null;
    return Comment(
      id: json['id'],
      text: json['text'],
      post: Post.fromJson(json['post']),
      parent: Comment.fromJson(json['parent']),
      replies: (json['replies'] as List<dynamic>)?.map((data) => Comment.fromJson(data))?.toList(),
      createdAt: DateTime.tryParse(json['createdAt'] ?? ''),
      tags: (json['tags'] as List<dynamic>)?.cast<String>(),
      meta: (json['meta'] as Map<String, dynamic>)?.cast<String, dynamic>(),
    );
  }
}
"#;
        assert_eq!(comment_model().emit(0)?, expected);
        Ok(())
    }

    #[test]
    fn test_entity_without_fields() -> Result<(), CodegenError> {
        let model = DartModel::new(
            EntityIndex::new(vec![entity(
                "Marker",
                "marker.entity.ts",
                "/out/marker.dart",
                vec![field("id", TypeNode::Keyword(Keyword::Number))],
            )]),
            GeneratorConfig::new("/out"),
        );
        let output = model.emit(0)?;

        assert!(output.starts_with("class Marker extends Model {\n  Marker({\n    String id,\n  }) : super(id);\n"));
        assert!(output.contains("    'id': id,\n  };\n"));
        assert!(output.contains("    return Marker(\n      id: json['id'],\n    );\n"));
        Ok(())
    }

    #[test]
    fn test_array_only_reference_is_imported() -> Result<(), CodegenError> {
        let model = DartModel::new(
            EntityIndex::new(vec![
                entity(
                    "User",
                    "user/user.entity.ts",
                    "/out/user/user.dart",
                    vec![field("posts", TypeNode::array(TypeNode::reference("Post")))],
                ),
                entity("Post", "post/post.entity.ts", "/out/post/post.dart", vec![]),
            ]),
            GeneratorConfig::new("/out"),
        );
        let output = model.emit(0)?;
        assert!(output.starts_with("import '../post/post.dart';\n\nclass User"));
        assert!(output.contains("'posts': posts?.map((post) => post.toJson())?.toList(),"));
        Ok(())
    }

    #[test]
    fn test_map_values_are_converted() -> Result<(), CodegenError> {
        let map_of = |value: TypeNode| TypeNode::Map {
            key: Box::new(TypeNode::Keyword(Keyword::String)),
            value: Box::new(value),
        };
        let model = DartModel::new(
            EntityIndex::new(vec![
                entity(
                    "Board",
                    "board.entity.ts",
                    "/out/board.dart",
                    vec![
                        field("byKey", map_of(TypeNode::reference("Card"))),
                        field("seenAt", map_of(TypeNode::reference("Date"))),
                        field("counts", map_of(TypeNode::Keyword(Keyword::Number))),
                    ],
                ),
                entity("Card", "card.entity.ts", "/out/card.dart", vec![]),
            ]),
            GeneratorConfig::new("/out"),
        );
        let output = model.emit(0)?;

        assert!(output.starts_with("import 'card.dart';\n\nclass Board"));
        assert!(output.contains("  Map<String, Card> byKey;\n"));
        assert!(output.contains(
            "'byKey': byKey?.map((key, value) => MapEntry(key, value?.toJson())),"
        ));
        assert!(output.contains(
            "byKey: (json['byKey'] as Map<String, dynamic>)?.map((key, data) => MapEntry(key, Card.fromJson(data))),"
        ));
        assert!(output.contains(
            "'seenAt': seenAt?.map((key, date) => MapEntry(key, date?.toIso8601String())),"
        ));
        assert!(output.contains(
            "seenAt: (json['seenAt'] as Map<String, dynamic>)?.map((key, data) => MapEntry(key, DateTime.tryParse(data ?? ''))),"
        ));
        assert!(output.contains("'counts': counts,"));
        assert!(output.contains(
            "counts: (json['counts'] as Map<String, dynamic>)?.cast<String, int>(),"
        ));
        Ok(())
    }

    #[test]
    fn test_configured_import_of_own_file_is_skipped() -> Result<(), CodegenError> {
        let model = DartModel::new(
            EntityIndex::new(vec![entity(
                "Tag",
                "tag.entity.ts",
                "/out/tag.dart",
                vec![field("label", TypeNode::Keyword(Keyword::String))],
            )]),
            GeneratorConfig::new("/out").with_import("./tag.dart"),
        );
        assert!(model.emit(0)?.starts_with("class Tag extends Model {"));
        Ok(())
    }

    #[test]
    fn test_unknown_types_are_dynamic() -> Result<(), CodegenError> {
        let model = DartModel::new(
            EntityIndex::new(vec![entity(
                "Post",
                "post.entity.ts",
                "/out/post.dart",
                vec![
                    field("blob", TypeNode::reference("Buffer")),
                    field("files", TypeNode::array(TypeNode::reference("Attachment"))),
                    field("shape", TypeNode::Unsupported("TypeLiteral".to_string())),
                    field("status", TypeNode::Literal(LiteralKind::String)),
                ],
            )]),
            GeneratorConfig::new("/out"),
        );
        let output = model.emit(0)?;

        assert!(!output.contains("import "));
        assert!(output.contains("  dynamic blob;\n"));
        assert!(output.contains("  List<dynamic> files;\n"));
        assert!(output.contains("  dynamic shape;\n"));
        assert!(output.contains("  String status;\n"));
        assert!(output.contains("'blob': blob,"));
        assert!(output.contains("blob: json['blob'],"));
        assert!(output.contains("files: (json['files'] as List<dynamic>)?.cast<dynamic>(),"));
        Ok(())
    }

    #[test]
    fn test_emit_is_deterministic() -> Result<(), CodegenError> {
        let model = comment_model();
        assert_eq!(model.emit(0)?, model.emit(0)?);
        assert!(model.emit(5).is_err());
        Ok(())
    }
}
