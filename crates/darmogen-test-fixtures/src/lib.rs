//! Test fixtures for darmogen
//!
//! Writes small TypeORM-style source trees into a temporary directory. Each
//! tree is laid out as `<root>/src/...` with `<root>` acting as package root.

use darmogen_core::{EntityIdentifier, GeneratorConfig, ParserConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixture categories
pub enum FixtureType {
    /// One entity, no imports
    Minimal,
    /// Users, profiles, posts and comments sharing a base class across files,
    /// imported both relatively and through the `src` alias
    Blog,
    /// Three entities whose heritage forms a cycle
    Cycle,
    /// One valid entity and one file with a syntax error
    Broken,
}

/// Main test fixtures provider
pub struct TestFixtures {
    temp_dir: Option<tempfile::TempDir>,
    root: PathBuf,
}

impl Default for TestFixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixtures {
    pub fn new() -> Self {
        Self {
            temp_dir: None,
            root: PathBuf::new(),
        }
    }

    /// Create a temporary project for `fixture_type`, returning its root
    pub fn setup(&mut self, fixture_type: FixtureType) -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        match fixture_type {
            FixtureType::Minimal => self.setup_minimal(&root),
            FixtureType::Blog => self.setup_blog(&root),
            FixtureType::Cycle => self.setup_cycle(&root),
            FixtureType::Broken => self.setup_broken(&root),
        }

        self.temp_dir = Some(dir);
        self.root = root.clone();
        root
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_root(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Parser settings matching the fixture layout
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::new(self.source_root(), EntityIdentifier::decorator("Entity"))
            .with_package_root(self.root.clone())
            .with_alias("src", "{cwd}")
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.out_dir())
    }

    fn write(&self, base: &Path, relative: &str, content: &str) {
        let path = base.join("src").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn setup_minimal(&self, base: &Path) {
        self.write(
            base,
            "tag/tag.entity.ts",
            r#"import { Entity, Column, PrimaryGeneratedColumn } from "typeorm";

@Entity()
export class Tag {
  @PrimaryGeneratedColumn("uuid")
  id: string;

  @Column()
  label: string;

  @Column()
  weight: number;
}
"#,
        );
    }

    fn setup_blog(&self, base: &Path) {
        self.write(
            base,
            "common/base.ts",
            r#"import { PrimaryGeneratedColumn, CreateDateColumn, UpdateDateColumn } from "typeorm";

export abstract class BaseModel {
  @PrimaryGeneratedColumn("uuid")
  id: string;

  @CreateDateColumn()
  createdAt: Date;

  @UpdateDateColumn()
  updatedAt: Date;
}
"#,
        );

        self.write(
            base,
            "user/roles.ts",
            r#"export const ROLES = ["admin", "editor", "reader"] as const;
"#,
        );

        self.write(
            base,
            "user/user.entity.ts",
            r#"import { Entity, Column, OneToMany, OneToOne } from "typeorm";
import { Exclude } from "class-transformer";
import { BaseModel } from "src/common/base";
import { Post } from "../post/post.entity";
import { Profile } from "./profile.entity";
import { ROLES } from "./roles";

@Entity()
export class User extends BaseModel {
  @Column()
  name: string;

  @Column({ nullable: true })
  email: string | null;

  @Column()
  @Exclude()
  password: string;

  @Column({ type: "enum", enum: ROLES })
  role: (typeof ROLES)[number];

  @Column()
  age: number;

  @Column()
  active: boolean;

  @OneToOne(() => Profile)
  profile: Profile;

  @OneToMany(() => Post, (post) => post.author)
  posts: Post[];

  @Column("simple-array")
  tags: string[];

  internalCounter: number;
}
"#,
        );

        self.write(
            base,
            "user/profile.entity.ts",
            r#"import { Entity, Column, OneToOne } from "typeorm";
import { BaseModel } from "../common/base";
import { User } from "./user.entity";

@Entity()
export class Profile extends BaseModel {
  @Column()
  bio: string;

  @Column({ nullable: true })
  birthday?: Date;

  @OneToOne(() => User, (user) => user.profile)
  user: User;
}
"#,
        );

        self.write(
            base,
            "post/post.entity.ts",
            r#"import { Entity, Column, ManyToOne, OneToMany } from "typeorm";
import { BaseModel } from "src/common/base";
import { User } from "src/user/user.entity";
import { Comment } from "./comment.entity";

@Entity()
export class Post extends BaseModel {
  @Column()
  title: string;

  @Column("text")
  body: string;

  @Column({ default: "draft" })
  status: "draft" | "published";

  @ManyToOne(() => User, (user) => user.posts)
  author: User;

  @OneToMany(() => Comment, (comment) => comment.post)
  comments: Comment[];

  @Column("json")
  metadata: Record<string, unknown>;

  @Column("json")
  attachments: Attachment[];
}

export class PostSummary {
  @Column()
  title: string;
}
"#,
        );

        self.write(
            base,
            "post/comment.entity.ts",
            r#"import { Entity, Column, ManyToOne, TreeChildren, TreeParent } from "typeorm";
import { BaseModel } from "src/common/base";
import { Post } from "./post.entity";

@Entity()
export class Comment extends BaseModel {
  @Column()
  text: string;

  @ManyToOne(() => Post, (post) => post.comments)
  post: Post;

  @TreeParent()
  parent: Comment;

  @TreeChildren()
  replies: Comment[];
}
"#,
        );

        self.write(
            base,
            "admin/admin.entity.ts",
            r#"import { Entity, Column } from "typeorm";
import { Exclude } from "class-transformer";
import { User } from "src/user/user.entity";

@Entity()
export class Admin extends User {
  @Column()
  name: string;

  @Column()
  level: number;

  @Exclude()
  email: string;
}
"#,
        );
    }

    fn setup_cycle(&self, base: &Path) {
        self.write(
            base,
            "a.entity.ts",
            r#"import { C } from "./c.entity";

@Entity()
export class A extends C {
  @Column()
  a: string;
}
"#,
        );
        self.write(
            base,
            "b.entity.ts",
            r#"import { A } from "./a.entity";

@Entity()
export class B extends A {
  @Column()
  b: string;
}
"#,
        );
        self.write(
            base,
            "c.entity.ts",
            r#"import { B } from "./b.entity";

@Entity()
export class C extends B {
  @Column()
  c: string;
}
"#,
        );
    }

    fn setup_broken(&self, base: &Path) {
        self.setup_minimal(base);
        self.write(
            base,
            "broken/broken.entity.ts",
            r#"@Entity()
export class Broken {
  @Column()
  name: string
"#,
        );
    }
}
