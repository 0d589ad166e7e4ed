// Shared fixtures for integration tests: hand-assembled class files and
// in-memory plugin packages.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

// ============================================================
// Class files
// ============================================================

/// Minimal JVM class file assembler. Only what the method-name extractor
/// reads is meaningful; everything else is structurally valid filler.
pub struct ClassFile {
    pool: Vec<u8>,
    next_index: u16,
    descriptor: u16,
    methods: Vec<u16>,
}

impl ClassFile {
    pub fn new() -> Self {
        let mut class = Self {
            pool: Vec::new(),
            next_index: 1,
            descriptor: 0,
            methods: Vec::new(),
        };
        class.descriptor = class.utf8("()V");
        class
    }

    /// Add a UTF-8 constant and return its pool index.
    pub fn utf8(&mut self, value: &str) -> u16 {
        self.utf8_raw(value.as_bytes())
    }

    /// Add a UTF-8 constant from raw (modified UTF-8) bytes.
    pub fn utf8_raw(&mut self, bytes: &[u8]) -> u16 {
        self.pool.push(1);
        self.pool.extend((bytes.len() as u16).to_be_bytes());
        self.pool.extend(bytes);
        self.take_slots(1)
    }

    /// Add a Long constant, which occupies two pool slots.
    pub fn long(mut self, value: i64) -> Self {
        self.pool.push(5);
        self.pool.extend(value.to_be_bytes());
        self.take_slots(2);
        self
    }

    /// Add a Double constant, which occupies two pool slots.
    pub fn double(mut self, value: f64) -> Self {
        self.pool.push(6);
        self.pool.extend(value.to_bits().to_be_bytes());
        self.take_slots(2);
        self
    }

    /// Add a Class constant pointing at a fresh UTF-8 name.
    pub fn class_ref(mut self, name: &str) -> Self {
        let name_index = self.utf8(name);
        self.pool.push(7);
        self.pool.extend(name_index.to_be_bytes());
        self.take_slots(1);
        self
    }

    pub fn method(mut self, name: &str) -> Self {
        let index = self.utf8(name);
        self.methods.push(index);
        self
    }

    /// Declare a method whose name index is `index` verbatim.
    pub fn method_with_index(mut self, index: u16) -> Self {
        self.methods.push(index);
        self
    }

    fn take_slots(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(0xCAFE_BABE_u32.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // minor
        out.extend(52u16.to_be_bytes()); // major: Java 8
        out.extend(self.next_index.to_be_bytes());
        out.extend(&self.pool);
        out.extend(0x0021u16.to_be_bytes()); // public super
        out.extend(0u16.to_be_bytes()); // this_class
        out.extend(0u16.to_be_bytes()); // super_class
        out.extend(0u16.to_be_bytes()); // interfaces

        // One field with one attribute, so member skipping is exercised
        out.extend(1u16.to_be_bytes());
        out.extend(0x0002u16.to_be_bytes());
        out.extend(self.descriptor.to_be_bytes());
        out.extend(self.descriptor.to_be_bytes());
        out.extend(1u16.to_be_bytes());
        out.extend(self.descriptor.to_be_bytes());
        out.extend(2u32.to_be_bytes());
        out.extend([0u8, 0]);

        out.extend((self.methods.len() as u16).to_be_bytes());
        for &name in &self.methods {
            out.extend(0x0001u16.to_be_bytes());
            out.extend(name.to_be_bytes());
            out.extend(self.descriptor.to_be_bytes());
            // A Code-like attribute of four opaque bytes
            out.extend(1u16.to_be_bytes());
            out.extend(self.descriptor.to_be_bytes());
            out.extend(4u32.to_be_bytes());
            out.extend([0xB1u8, 0, 0, 0]);
        }

        out.extend(0u16.to_be_bytes()); // class attributes
        out
    }
}

pub fn class_with_methods(methods: &[&str]) -> Vec<u8> {
    methods
        .iter()
        .fold(ClassFile::new(), |class, name| class.method(name))
        .build()
}

// ============================================================
// Containers
// ============================================================

/// Build a ZIP container in memory. Entries keep the given order.
pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        // Fixed timestamp so identical inputs produce identical bytes
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn plugin_xml(id: &str, name: &str, description: &str, depends: &[&str]) -> String {
    let depends: String = depends
        .iter()
        .map(|d| format!("  <depends>{d}</depends>\n"))
        .collect();
    format!(
        r#"<idea-plugin>
  <id>{id}</id>
  <name>{name}</name>
  <version>1.0.0</version>
  <vendor>Example</vendor>
  <description><![CDATA[<p>{description}</p>]]></description>
  <idea-version since-build="231"/>
{depends}</idea-plugin>"#
    )
}

/// Shape of a synthetic plugin package.
pub struct PluginFixture<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub depends: &'a [&'a str],
    /// Package path (slash-separated) → method names of one class in it
    pub classes: &'a [(&'a str, &'a [&'a str])],
    /// Names of bundled third-party library JARs
    pub libraries: &'a [&'a str],
}

/// Build a plugin distribution: `<dir>/lib/<dir>.jar` with the descriptor
/// and classes, plus one small JAR per library.
pub fn plugin_package(fixture: &PluginFixture<'_>) -> Vec<u8> {
    let dir = fixture.id.rsplit('.').next().unwrap_or(fixture.id);

    let mut own_entries: Vec<(String, Vec<u8>)> = vec![(
        "META-INF/plugin.xml".to_string(),
        plugin_xml(fixture.id, fixture.name, fixture.description, fixture.depends).into_bytes(),
    )];
    for (i, (package, methods)) in fixture.classes.iter().enumerate() {
        own_entries.push((
            format!("{package}/Class{i}.class"),
            class_with_methods(methods),
        ));
    }
    let own_refs: Vec<(&str, Vec<u8>)> = own_entries
        .iter()
        .map(|(n, b)| (n.as_str(), b.clone()))
        .collect();

    let mut entries: Vec<(String, Vec<u8>)> =
        vec![(format!("{dir}/lib/{dir}.jar"), zip_bytes(&own_refs))];
    for library in fixture.libraries {
        let stem = library.trim_end_matches(".jar").replace(['-', '.'], "/");
        let class_path = format!("{stem}/Lib.class");
        entries.push((
            format!("{dir}/lib/{library}"),
            zip_bytes(&[(class_path.as_str(), class_with_methods(&["libCall"]))]),
        ));
    }

    let refs: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(n, b)| (n.as_str(), b.clone()))
        .collect();
    zip_bytes(&refs)
}

pub fn fancy_plugin() -> Vec<u8> {
    plugin_package(&PluginFixture {
        id: "com.example.fancy",
        name: "Fancy Tools",
        description: "Adds <b>fancy</b> refactorings for Kotlin code",
        depends: &["com.intellij.modules.platform", "org.jetbrains.kotlin"],
        classes: &[
            ("com/example/fancy/actions", &["<init>", "actionPerformed", "updateToolbar"]),
            ("com/example/fancy/refactor", &["renameSymbol", "extractMethod", "inlineVariable"]),
        ],
        libraries: &["gson-2.10.1.jar"],
    })
}

pub fn unrelated_plugin() -> Vec<u8> {
    plugin_package(&PluginFixture {
        id: "org.acme.dbviewer",
        name: "Acme Database Viewer",
        description: "Browse tables and run queries against remote databases",
        depends: &["com.intellij.database"],
        classes: &[
            ("org/acme/dbviewer/grid", &["renderCell", "sortColumn", "paginateRows"]),
            ("org/acme/dbviewer/jdbc", &["openConnection", "executeQuery", "closeResultSet"]),
        ],
        libraries: &["postgresql-42.7.3.jar"],
    })
}
