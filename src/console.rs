use std::io::{self, Write};

use crate::structure::ClassRecord;

pub fn print_class_name<W: Write>(out: &mut W, class: &ClassRecord) -> io::Result<()> {
    writeln!(out, "  {}", class.name)
}

pub fn print_verbose_class<W: Write>(out: &mut W, class: &ClassRecord) -> io::Result<()> {
    writeln!(out, "  {}", class.name)?;
    writeln!(out, "    Type: {}", class.kind.label())?;

    if let Some(superclass) = &class.superclass {
        writeln!(out, "    Superclass: {superclass}")?;
    }
    if !class.interfaces.is_empty() {
        writeln!(out, "    Interfaces: {}", class.interfaces.join(", "))?;
    }
    writeln!(out, "    Package: {}", class.package)?;

    let fields = class.sorted_fields();
    if !fields.is_empty() {
        writeln!(out, "    Fields:")?;
        for field in fields {
            let scope = if field.is_static {
                "class variable"
            } else {
                "instance variable"
            };
            writeln!(
                out,
                "      {} ({scope})",
                declaration(&field.modifiers, &[field.field_type.as_str(), field.name.as_str()])
            )?;
        }
    }

    let methods = class.reportable_methods();
    if !methods.is_empty() {
        writeln!(out, "    Methods:")?;
        for method in methods {
            let head = declaration(
                &method.modifiers,
                &[method.return_type.as_str(), method.name.as_str()],
            );
            writeln!(out, "      {head}({})", method.parameter_types.join(", "))?;
        }
    }

    let constructors = class.sorted_constructors();
    if !constructors.is_empty() {
        writeln!(out, "    Constructors:")?;
        for constructor in constructors {
            let head = declaration(&constructor.modifiers, &[class.simple_name()]);
            writeln!(out, "      {head}({})", constructor.parameter_types.join(", "))?;
        }
    }

    writeln!(out)
}

fn declaration(modifiers: &str, rest: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(rest.len() + 1);
    if !modifiers.is_empty() {
        parts.push(modifiers);
    }
    parts.extend_from_slice(rest);
    parts.join(" ")
}
