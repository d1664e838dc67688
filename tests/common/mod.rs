#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;

/// Assembles minimal class files: constant pool, members and the attributes
/// the scanner reads (`Signature`, annotations, parameter annotations).
pub struct ClassBuilder {
    pool: Vec<Vec<u8>>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
}

pub struct Member<'a> {
    pub access_flags: u16,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub signature: Option<&'a str>,
    pub annotations: &'a [&'a str],
    pub invisible_annotations: &'a [&'a str],
    pub parameter_annotations: &'a [&'a [&'a str]],
}

impl<'a> Member<'a> {
    pub fn new(access_flags: u16, name: &'a str, descriptor: &'a str) -> Self {
        Self {
            access_flags,
            name,
            descriptor,
            signature: None,
            annotations: &[],
            invisible_annotations: &[],
            parameter_annotations: &[],
        }
    }
}

impl ClassBuilder {
    /// `name` in internal form, e.g. `com/example/Foo`.
    pub fn new(name: &str, access_flags: u16) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            access_flags,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        };
        builder.this_class = builder.class_ref(name);
        builder.super_class = builder.class_ref("java/lang/Object");
        builder
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = self.class_ref(name);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        let index = self.class_ref(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(mut self, member: Member<'_>) -> Self {
        let bytes = self.member(&member);
        self.fields.push(bytes);
        self
    }

    pub fn method(mut self, member: Member<'_>) -> Self {
        let bytes = self.member(&member);
        self.methods.push(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        push_u2(&mut out, self.pool.len() + 1);
        for entry in &self.pool {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        push_u2(&mut out, self.interfaces.len());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        push_u2(&mut out, self.fields.len());
        for field in &self.fields {
            out.extend_from_slice(field);
        }
        push_u2(&mut out, self.methods.len());
        for method in &self.methods {
            out.extend_from_slice(method);
        }
        push_u2(&mut out, 0);
        out
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        push_u2(&mut entry, value.len());
        entry.extend_from_slice(value.as_bytes());
        self.pool.push(entry);
        self.pool.len() as u16
    }

    fn class_ref(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name_index.to_be_bytes());
        self.pool.push(entry);
        self.pool.len() as u16
    }

    fn member(&mut self, member: &Member<'_>) -> Vec<u8> {
        let name = self.utf8(member.name);
        let descriptor = self.utf8(member.descriptor);
        let mut attributes: Vec<Vec<u8>> = Vec::new();

        if let Some(signature) = member.signature {
            let attr_name = self.utf8("Signature");
            let value = self.utf8(signature);
            attributes.push(attribute(attr_name, &value.to_be_bytes()));
        }
        if !member.annotations.is_empty() {
            let attr_name = self.utf8("RuntimeVisibleAnnotations");
            let body = self.annotations(member.annotations);
            attributes.push(attribute(attr_name, &body));
        }
        if !member.invisible_annotations.is_empty() {
            let attr_name = self.utf8("RuntimeInvisibleAnnotations");
            let body = self.annotations(member.invisible_annotations);
            attributes.push(attribute(attr_name, &body));
        }
        if !member.parameter_annotations.is_empty() {
            let attr_name = self.utf8("RuntimeVisibleParameterAnnotations");
            let mut body = vec![member.parameter_annotations.len() as u8];
            for group in member.parameter_annotations {
                body.extend(self.annotations(group));
            }
            attributes.push(attribute(attr_name, &body));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&member.access_flags.to_be_bytes());
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&descriptor.to_be_bytes());
        push_u2(&mut out, attributes.len());
        for attr in attributes {
            out.extend(attr);
        }
        out
    }

    /// Each annotation gets one `value = "x"` element so element skipping is exercised.
    fn annotations(&mut self, types: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        push_u2(&mut body, types.len());
        for ty in types {
            let type_index = self.utf8(ty);
            let element_name = self.utf8("value");
            let element_value = self.utf8("x");
            body.extend_from_slice(&type_index.to_be_bytes());
            push_u2(&mut body, 1);
            body.extend_from_slice(&element_name.to_be_bytes());
            body.push(b's');
            body.extend_from_slice(&element_value.to_be_bytes());
        }
        body
    }
}

fn attribute(name_index: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&name_index.to_be_bytes());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
    out
}

fn push_u2(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u16).to_be_bytes());
}

/// `com.example.Foo` with a public no-arg constructor and `public void bar()`.
pub fn foo_class() -> Vec<u8> {
    ClassBuilder::new("com/example/Foo", ACC_PUBLIC | ACC_SUPER)
        .method(Member::new(ACC_PUBLIC, "<init>", "()V"))
        .method(Member::new(ACC_PUBLIC, "bar", "()V"))
        .build()
}

pub fn simple_class(internal_name: &str) -> Vec<u8> {
    ClassBuilder::new(internal_name, ACC_PUBLIC | ACC_SUPER)
        .method(Member::new(ACC_PUBLIC, "<init>", "()V"))
        .build()
}

pub fn write_class(root: &Path, internal_name: &str, bytes: &[u8]) -> anyhow::Result<()> {
    let path = root.join(format!("{internal_name}.class"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}
