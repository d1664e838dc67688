use crate::classfile::{
    ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_NATIVE, ACC_PRIVATE,
    ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_STRICT, ACC_SYNCHRONIZED, ACC_TRANSIENT,
    ACC_VOLATILE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Interface,
    AbstractClass,
    Enum,
    Annotation,
    Class,
}

impl ClassKind {
    /// Only the first matching flag counts: interface, abstract, enum, annotation.
    pub fn from_access_flags(flags: u16) -> Self {
        if flags & ACC_INTERFACE != 0 {
            ClassKind::Interface
        } else if flags & ACC_ABSTRACT != 0 {
            ClassKind::AbstractClass
        } else if flags & ACC_ENUM != 0 {
            ClassKind::Enum
        } else if flags & ACC_ANNOTATION != 0 {
            ClassKind::Annotation
        } else {
            ClassKind::Class
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClassKind::Interface => "Interface",
            ClassKind::AbstractClass => "Abstract Class",
            ClassKind::Enum => "Enum",
            ClassKind::Annotation => "Annotation",
            ClassKind::Class => "Class",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    pub package: String,
    pub kind: ClassKind,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
    pub constructors: Vec<ConstructorRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub name: String,
    pub field_type: String,
    pub modifiers: String,
    pub is_static: bool,
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    pub name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub modifiers: String,
    pub is_static: bool,
    pub annotations: Vec<String>,
    pub parameter_annotations: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorRecord {
    pub parameter_types: Vec<String>,
    pub modifiers: String,
    pub annotations: Vec<String>,
    pub parameter_annotations: Vec<Vec<String>>,
}

impl ClassRecord {
    /// Name without package or enclosing classes: `a.b.Outer$Inner` gives `Inner`.
    pub fn simple_name(&self) -> &str {
        let tail = self.name.rsplit('.').next().unwrap_or(&self.name);
        tail.rsplit('$').next().unwrap_or(tail)
    }

    pub fn sorted_fields(&self) -> Vec<&FieldRecord> {
        let mut fields: Vec<&FieldRecord> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        fields
    }

    /// Methods sorted by name, without constructors, initializers and lambda bodies.
    pub fn reportable_methods(&self) -> Vec<&MethodRecord> {
        let mut methods: Vec<&MethodRecord> = self
            .methods
            .iter()
            .filter(|m| is_reportable_method(&m.name))
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    /// Constructors by ascending parameter count; ties keep declaration order.
    pub fn sorted_constructors(&self) -> Vec<&ConstructorRecord> {
        let mut constructors: Vec<&ConstructorRecord> = self.constructors.iter().collect();
        constructors.sort_by_key(|c| c.parameter_types.len());
        constructors
    }
}

pub fn is_reportable_method(name: &str) -> bool {
    name != "<init>" && name != "<clinit>" && !name.contains("lambda$")
}

pub fn package_of(class_name: &str) -> String {
    class_name
        .rsplit_once('.')
        .map(|(pkg, _)| pkg.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
}

/// Space-joined modifiers in `java.lang.reflect.Modifier` order.
///
/// On methods the bits that mean `transient`/`volatile` on fields are
/// varargs/bridge markers and are not rendered.
pub fn render_modifiers(flags: u16, kind: MemberKind) -> String {
    let mut words: Vec<&str> = Vec::new();
    if flags & ACC_PUBLIC != 0 {
        words.push("public");
    }
    if flags & ACC_PROTECTED != 0 {
        words.push("protected");
    }
    if flags & ACC_PRIVATE != 0 {
        words.push("private");
    }
    if kind == MemberKind::Method && flags & ACC_ABSTRACT != 0 {
        words.push("abstract");
    }
    if flags & ACC_STATIC != 0 {
        words.push("static");
    }
    if flags & ACC_FINAL != 0 {
        words.push("final");
    }
    match kind {
        MemberKind::Field => {
            if flags & ACC_TRANSIENT != 0 {
                words.push("transient");
            }
            if flags & ACC_VOLATILE != 0 {
                words.push("volatile");
            }
        }
        MemberKind::Method => {
            if flags & ACC_SYNCHRONIZED != 0 {
                words.push("synchronized");
            }
            if flags & ACC_NATIVE != 0 {
                words.push("native");
            }
            if flags & ACC_STRICT != 0 {
                words.push("strictfp");
            }
        }
    }
    words.join(" ")
}
