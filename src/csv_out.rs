//! CSV/TSV writers for methods, fields and constructors.
//!
//! The first write to a `(kind, path)` pair truncates the file and writes the
//! header; later writes append rows. Several inputs sharing one destination
//! therefore produce a single header followed by every input's rows in order.

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{CsvFormat, OutputKind};
use crate::structure::ClassRecord;

pub const METHOD_HEADERS: [&str; 9] = [
    "source-path",
    "class-name",
    "method-name",
    "return-type",
    "parameters",
    "modifiers",
    "is-static",
    "method-annotations",
    "parameter-annotations",
];

pub const FIELD_HEADERS: [&str; 7] = [
    "source-path",
    "class-name",
    "field-name",
    "field-type",
    "modifiers",
    "is-static",
    "field-annotations",
];

pub const CONSTRUCTOR_HEADERS: [&str; 6] = [
    "source-path",
    "class-name",
    "parameters",
    "modifiers",
    "constructor-annotations",
    "parameter-annotations",
];

const ANNOTATION_SEPARATOR: &str = "|";
const PARAMETER_GROUP_SEPARATOR: &str = ";";

/// Which `(kind, destination)` pairs already carry a header.
#[derive(Debug, Default)]
pub struct CsvTargetState {
    written: HashSet<(OutputKind, PathBuf)>,
}

impl CsvTargetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self, kind: OutputKind, path: &Path) -> bool {
        self.written.contains(&(kind, path.to_path_buf()))
    }

    fn mark_started(&mut self, kind: OutputKind, path: &Path) {
        self.written.insert((kind, path.to_path_buf()));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CsvSettings {
    pub format: CsvFormat,
    pub encoding: &'static Encoding,
}

#[derive(Debug, Serialize)]
struct MethodRow<'a> {
    source_path: &'a str,
    class_name: &'a str,
    method_name: &'a str,
    return_type: &'a str,
    parameters: String,
    modifiers: &'a str,
    is_static: bool,
    method_annotations: String,
    parameter_annotations: String,
}

#[derive(Debug, Serialize)]
struct FieldRow<'a> {
    source_path: &'a str,
    class_name: &'a str,
    field_name: &'a str,
    field_type: &'a str,
    modifiers: &'a str,
    is_static: bool,
    field_annotations: String,
}

#[derive(Debug, Serialize)]
struct ConstructorRow<'a> {
    source_path: &'a str,
    class_name: &'a str,
    parameters: String,
    modifiers: &'a str,
    constructor_annotations: String,
    parameter_annotations: String,
}

/// Appends one input's rows for `kind` to `path`, writing the header first if
/// this is the first write to that pair. Returns the number of data rows.
pub fn write_rows(
    state: &mut CsvTargetState,
    kind: OutputKind,
    path: &Path,
    settings: CsvSettings,
    source_path: &str,
    classes: &[ClassRecord],
) -> Result<usize> {
    let first_write = !state.is_started(kind, path);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(settings.format.delimiter())
        .terminator(csv::Terminator::CRLF)
        .has_headers(false)
        .from_writer(Vec::new());

    if first_write {
        writer.write_record(headers(kind))?;
    }

    let rows = match kind {
        OutputKind::Methods => write_method_rows(&mut writer, source_path, classes)?,
        OutputKind::Fields => write_field_rows(&mut writer, source_path, classes)?,
        OutputKind::Constructors => write_constructor_rows(&mut writer, source_path, classes)?,
    };

    let buffer = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush {} rows: {}", kind.label(), e.error()))?;
    let text = String::from_utf8(buffer).context("CSV output is not valid UTF-8")?;
    let bytes = encode(&text, settings.encoding);

    let mut options = OpenOptions::new();
    options.create(true);
    if first_write {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open output file: {}", path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    state.mark_started(kind, path);
    Ok(rows)
}

pub fn headers(kind: OutputKind) -> &'static [&'static str] {
    match kind {
        OutputKind::Methods => &METHOD_HEADERS,
        OutputKind::Fields => &FIELD_HEADERS,
        OutputKind::Constructors => &CONSTRUCTOR_HEADERS,
    }
}

fn write_method_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    source_path: &str,
    classes: &[ClassRecord],
) -> Result<usize> {
    let mut rows = 0;
    for class in classes {
        for method in class.reportable_methods() {
            writer.serialize(MethodRow {
                source_path,
                class_name: &class.name,
                method_name: &method.name,
                return_type: &method.return_type,
                parameters: method.parameter_types.join(", "),
                modifiers: &method.modifiers,
                is_static: method.is_static,
                method_annotations: join_annotations(&method.annotations),
                parameter_annotations: join_parameter_annotations(&method.parameter_annotations),
            })?;
            rows += 1;
        }
    }
    Ok(rows)
}

fn write_field_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    source_path: &str,
    classes: &[ClassRecord],
) -> Result<usize> {
    let mut rows = 0;
    for class in classes {
        for field in class.sorted_fields() {
            writer.serialize(FieldRow {
                source_path,
                class_name: &class.name,
                field_name: &field.name,
                field_type: &field.field_type,
                modifiers: &field.modifiers,
                is_static: field.is_static,
                field_annotations: join_annotations(&field.annotations),
            })?;
            rows += 1;
        }
    }
    Ok(rows)
}

fn write_constructor_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    source_path: &str,
    classes: &[ClassRecord],
) -> Result<usize> {
    let mut rows = 0;
    for class in classes {
        for constructor in class.sorted_constructors() {
            writer.serialize(ConstructorRow {
                source_path,
                class_name: &class.name,
                parameters: constructor.parameter_types.join(", "),
                modifiers: &constructor.modifiers,
                constructor_annotations: join_annotations(&constructor.annotations),
                parameter_annotations: join_parameter_annotations(
                    &constructor.parameter_annotations,
                ),
            })?;
            rows += 1;
        }
    }
    Ok(rows)
}

fn join_annotations(annotations: &[String]) -> String {
    annotations.join(ANNOTATION_SEPARATOR)
}

/// One `|`-joined group per parameter, groups joined with `;`; empty when no
/// parameter is annotated.
fn join_parameter_annotations(groups: &[Vec<String>]) -> String {
    if groups.iter().all(|g| g.is_empty()) {
        return String::new();
    }
    groups
        .iter()
        .map(|g| join_annotations(g))
        .collect::<Vec<_>>()
        .join(PARAMETER_GROUP_SEPARATOR)
}

fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_16LE {
        return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    }
    if encoding == UTF_16BE {
        return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    }
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{ClassKind, ConstructorRecord, FieldRecord, MethodRecord};
    use encoding_rs::{SHIFT_JIS, UTF_8};
    use pretty_assertions::assert_eq;

    fn utf8_csv() -> CsvSettings {
        CsvSettings {
            format: CsvFormat::Csv,
            encoding: UTF_8,
        }
    }

    fn foo() -> ClassRecord {
        ClassRecord {
            name: "com.example.Foo".to_string(),
            package: "com.example".to_string(),
            kind: ClassKind::Class,
            superclass: None,
            interfaces: Vec::new(),
            fields: vec![FieldRecord {
                name: "count".to_string(),
                field_type: "int".to_string(),
                modifiers: "private static".to_string(),
                is_static: true,
                annotations: vec!["a.B".to_string(), "c.D".to_string()],
            }],
            methods: vec![
                MethodRecord {
                    name: "put".to_string(),
                    return_type: "void".to_string(),
                    parameter_types: vec!["java.lang.String".to_string(), "int".to_string()],
                    modifiers: "public".to_string(),
                    is_static: false,
                    annotations: Vec::new(),
                    parameter_annotations: vec![
                        vec!["x.NonNull".to_string(), "x.Valid".to_string()],
                        Vec::new(),
                    ],
                },
                MethodRecord {
                    name: "lambda$put$0".to_string(),
                    return_type: "void".to_string(),
                    parameter_types: Vec::new(),
                    modifiers: "private static".to_string(),
                    is_static: true,
                    annotations: Vec::new(),
                    parameter_annotations: Vec::new(),
                },
            ],
            constructors: vec![ConstructorRecord {
                parameter_types: Vec::new(),
                modifiers: "public".to_string(),
                annotations: Vec::new(),
                parameter_annotations: Vec::new(),
            }],
        }
    }

    #[test]
    fn first_write_truncates_and_later_writes_append() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("m.csv");
        std::fs::write(&out, "stale content\n")?;

        let mut state = CsvTargetState::new();
        let classes = vec![foo()];
        write_rows(&mut state, OutputKind::Methods, &out, utf8_csv(), "a.jar", &classes)?;
        write_rows(&mut state, OutputKind::Methods, &out, utf8_csv(), "b", &classes)?;

        let content = std::fs::read_to_string(&out)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "source-path,class-name,method-name,return-type,parameters,modifiers,is-static,method-annotations,parameter-annotations",
                "a.jar,com.example.Foo,put,void,\"java.lang.String, int\",public,false,,x.NonNull|x.Valid;",
                "b,com.example.Foo,put,void,\"java.lang.String, int\",public,false,,x.NonNull|x.Valid;",
            ]
        );
        assert!(content.ends_with("\r\n"));
        Ok(())
    }

    #[test]
    fn header_state_is_kept_per_kind() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("shared.csv");
        let mut state = CsvTargetState::new();
        let classes = vec![foo()];

        write_rows(&mut state, OutputKind::Fields, &out, utf8_csv(), "a.jar", &classes)?;
        assert!(state.is_started(OutputKind::Fields, &out));
        assert!(!state.is_started(OutputKind::Constructors, &out));

        write_rows(&mut state, OutputKind::Constructors, &out, utf8_csv(), "a.jar", &classes)?;
        let content = std::fs::read_to_string(&out)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "source-path,class-name,parameters,modifiers,constructor-annotations,parameter-annotations",
                "a.jar,com.example.Foo,,public,,",
            ]
        );
        Ok(())
    }

    #[test]
    fn empty_input_writes_only_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("f.tsv");
        let mut state = CsvTargetState::new();
        let settings = CsvSettings {
            format: CsvFormat::Tsv,
            encoding: UTF_8,
        };

        let rows = write_rows(&mut state, OutputKind::Fields, &out, settings, "a.jar", &[])?;
        assert_eq!(rows, 0);
        assert_eq!(
            std::fs::read_to_string(&out)?,
            "source-path\tclass-name\tfield-name\tfield-type\tmodifiers\tis-static\tfield-annotations\r\n"
        );
        Ok(())
    }

    #[test]
    fn fields_render_static_flag_and_pipe_joined_annotations_as_tsv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("f.tsv");
        let mut state = CsvTargetState::new();
        let settings = CsvSettings {
            format: CsvFormat::Tsv,
            encoding: UTF_8,
        };

        write_rows(&mut state, OutputKind::Fields, &out, settings, "lib", &[foo()])?;
        let content = std::fs::read_to_string(&out)?;
        assert_eq!(
            content.lines().nth(1),
            Some("lib\tcom.example.Foo\tcount\tint\tprivate static\ttrue\ta.B|c.D")
        );
        Ok(())
    }

    #[test]
    fn output_is_encoded_in_requested_charset() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("m.csv");
        let mut state = CsvTargetState::new();
        let settings = CsvSettings {
            format: CsvFormat::Csv,
            encoding: SHIFT_JIS,
        };

        write_rows(&mut state, OutputKind::Methods, &out, settings, "クラス", &[foo()])?;
        let bytes = std::fs::read(&out)?;
        let (decoded, _, had_errors) = SHIFT_JIS.decode(&bytes);
        assert!(!had_errors);
        assert!(decoded.contains("クラス,com.example.Foo,put"));
        assert!(std::str::from_utf8(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn parameter_annotation_groups() {
        assert_eq!(join_parameter_annotations(&[]), "");
        assert_eq!(join_parameter_annotations(&[Vec::new(), Vec::new()]), "");
        assert_eq!(
            join_parameter_annotations(&[
                Vec::new(),
                vec!["a.A".to_string()],
                vec!["b.B".to_string(), "c.C".to_string()],
            ]),
            ";a.A;b.B|c.C"
        );
    }

    #[test]
    fn utf16_is_encoded_from_code_units() {
        assert_eq!(encode("Az", UTF_16LE), vec![0x41, 0x00, 0x7A, 0x00]);
        assert_eq!(encode("Az", UTF_16BE), vec![0x00, 0x41, 0x00, 0x7A]);
    }
}
