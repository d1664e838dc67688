use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::catalog;
use crate::classfile::{
    ACC_ABSTRACT, ACC_INTERFACE, ACC_PRIVATE, ACC_STATIC, ClassFile, MemberInfo, parse_class,
};
use crate::scan::{is_class_file_name, is_descriptor_class, scan_class_files};
use crate::signature::{annotation_name, binary_name, render_field_type, render_method_types};
use crate::structure::{
    ClassKind, ClassRecord, ConstructorRecord, FieldRecord, MemberKind, MethodRecord, package_of,
    render_modifiers,
};

/// Source of class metadata for one input path.
///
/// Each call is scoped to exactly the given file or directory; results from
/// different inputs are never merged.
pub trait ClassIntrospector {
    fn enumerate_classes(&self, path: &Path) -> Result<Vec<ClassRecord>>;
}

/// Reads class files directly: a `.class` file, a JAR/ZIP archive, or a
/// directory tree of `.class` files.
#[derive(Debug, Clone, Default)]
pub struct BytecodeIntrospector;

impl BytecodeIntrospector {
    pub fn new() -> Self {
        Self
    }
}

impl ClassIntrospector for BytecodeIntrospector {
    fn enumerate_classes(&self, path: &Path) -> Result<Vec<ClassRecord>> {
        let mut records = Vec::new();

        if path.is_dir() {
            for class_path in scan_class_files(path)? {
                if is_descriptor_class(&class_path.to_string_lossy()) {
                    continue;
                }
                let bytes = std::fs::read(&class_path)
                    .with_context(|| format!("Failed to read class file: {}", class_path.display()))?;
                push_parsed(&mut records, &bytes, &class_path.to_string_lossy());
            }
        } else if is_class_file_name(path) {
            if !is_descriptor_class(&path.to_string_lossy()) {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read class file: {}", path.display()))?;
                push_parsed(&mut records, &bytes, &path.to_string_lossy());
            }
        } else {
            match catalog::catalog(path)? {
                Some(entries) => {
                    for entry in entries {
                        push_parsed(&mut records, &entry.bytes, &entry.name);
                    }
                }
                None => warn!("Not a class file or archive, skipping: {}", path.display()),
            }
        }

        Ok(records)
    }
}

fn push_parsed(records: &mut Vec<ClassRecord>, bytes: &[u8], origin: &str) {
    match parse_class(bytes) {
        Ok(class_file) => records.push(to_class_record(&class_file)),
        Err(e) => debug!("Skipping unreadable class {origin}: {e}"),
    }
}

pub fn to_class_record(class_file: &ClassFile) -> ClassRecord {
    let name = binary_name(&class_file.this_class);
    let is_interface = class_file.access_flags & ACC_INTERFACE != 0;

    let fields = class_file.fields.iter().map(to_field_record).collect();

    let mut methods = Vec::new();
    let mut constructors = Vec::new();
    for member in &class_file.methods {
        match member.name.as_str() {
            "<init>" => constructors.push(to_constructor_record(member)),
            "<clinit>" => {}
            _ => methods.push(to_method_record(member, is_interface)),
        }
    }

    ClassRecord {
        package: package_of(&name),
        kind: ClassKind::from_access_flags(class_file.access_flags),
        superclass: class_file
            .super_class
            .as_deref()
            .filter(|s| *s != "java/lang/Object")
            .map(binary_name),
        interfaces: class_file.interfaces.iter().map(|i| binary_name(i)).collect(),
        fields,
        methods,
        constructors,
        name,
    }
}

fn to_field_record(member: &MemberInfo) -> FieldRecord {
    let field_type = member
        .signature
        .as_deref()
        .and_then(|s| render_field_type(s).ok())
        .or_else(|| render_field_type(&member.descriptor).ok())
        .unwrap_or_else(|| member.descriptor.clone());

    FieldRecord {
        name: member.name.clone(),
        field_type,
        modifiers: render_modifiers(member.access_flags, MemberKind::Field),
        is_static: member.access_flags & ACC_STATIC != 0,
        annotations: annotation_names(&member.annotations),
    }
}

fn to_method_record(member: &MemberInfo, in_interface: bool) -> MethodRecord {
    let (parameter_types, return_type) = member_types(member);
    let mut modifiers = render_modifiers(member.access_flags, MemberKind::Method);
    if in_interface && member.access_flags & (ACC_ABSTRACT | ACC_STATIC | ACC_PRIVATE) == 0 {
        if !modifiers.is_empty() {
            modifiers.push(' ');
        }
        modifiers.push_str("default");
    }

    MethodRecord {
        name: member.name.clone(),
        parameter_annotations: parameter_annotation_names(member, parameter_types.len()),
        return_type,
        parameter_types,
        modifiers,
        is_static: member.access_flags & ACC_STATIC != 0,
        annotations: annotation_names(&member.annotations),
    }
}

fn to_constructor_record(member: &MemberInfo) -> ConstructorRecord {
    let (parameter_types, _) = member_types(member);
    ConstructorRecord {
        parameter_annotations: parameter_annotation_names(member, parameter_types.len()),
        parameter_types,
        modifiers: render_modifiers(member.access_flags, MemberKind::Method),
        annotations: annotation_names(&member.annotations),
    }
}

/// Prefers the generic signature, unless its arity disagrees with the
/// descriptor (synthetic outer-instance or enum name/ordinal parameters).
fn member_types(member: &MemberInfo) -> (Vec<String>, String) {
    let erased = render_method_types(&member.descriptor).ok();
    let generic = member
        .signature
        .as_deref()
        .and_then(|s| render_method_types(s).ok());

    match (generic, erased) {
        (Some(g), Some(e)) if g.parameters.len() == e.parameters.len() => {
            (g.parameters, g.return_type)
        }
        (_, Some(e)) => (e.parameters, e.return_type),
        (Some(g), None) => (g.parameters, g.return_type),
        (None, None) => (Vec::new(), member.descriptor.clone()),
    }
}

fn annotation_names(descriptors: &[String]) -> Vec<String> {
    descriptors.iter().map(|d| annotation_name(d)).collect()
}

/// javac omits synthetic leading parameters (outer instance, enum name and
/// ordinal) from the parameter annotation tables, so short tables are aligned
/// to the trailing parameters.
fn parameter_annotation_names(member: &MemberInfo, parameter_count: usize) -> Vec<Vec<String>> {
    let missing = parameter_count.saturating_sub(member.parameter_annotations.len());
    let mut groups: Vec<Vec<String>> = vec![Vec::new(); missing];
    groups.extend(
        member
            .parameter_annotations
            .iter()
            .map(|group| annotation_names(group)),
    );
    groups
}
