//! Renders JVM descriptors and generic signatures as Java source-like names.
//!
//! `Ljava/util/List<Ljava/lang/String;>;` becomes `java.util.List<java.lang.String>`,
//! `[I` becomes `int[]`. Plain descriptors are a subset of the signature grammar,
//! so a single parser handles both.

use crate::classfile::ClassParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTypes {
    pub parameters: Vec<String>,
    pub return_type: String,
}

pub fn render_field_type(signature: &str) -> Result<String, ClassParseError> {
    SignatureParser::new(signature).parse_type()
}

pub fn render_method_types(signature: &str) -> Result<MethodTypes, ClassParseError> {
    let mut parser = SignatureParser::new(signature);
    if parser.peek() == Some(b'<') {
        parser.skip_type_parameters()?;
    }
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    loop {
        match parser.peek() {
            Some(b')') => break,
            Some(_) => parameters.push(parser.parse_type()?),
            None => return Err(parser.error()),
        }
    }
    parser.expect(b')')?;
    // Anything after the return type is a throws clause.
    let return_type = parser.parse_type()?;
    Ok(MethodTypes {
        parameters,
        return_type,
    })
}

/// `java/lang/String` to `java.lang.String`.
pub fn binary_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

/// `Ljavax/annotation/Nonnull;` to `javax.annotation.Nonnull`.
pub fn annotation_name(type_descriptor: &str) -> String {
    render_field_type(type_descriptor).unwrap_or_else(|_| binary_name(type_descriptor))
}

struct SignatureParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn expect(&mut self, wanted: u8) -> Result<(), ClassParseError> {
        match self.bump() {
            Some(b) if b == wanted => Ok(()),
            _ => Err(self.error()),
        }
    }

    fn error(&self) -> ClassParseError {
        ClassParseError::InvalidDescriptor(self.input.to_string())
    }

    // Delimiters are ASCII, so the slice always falls on char boundaries.
    fn take_until(&mut self, stop: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stop(b) {
                break;
            }
            self.pos += 1;
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn parse_type(&mut self) -> Result<String, ClassParseError> {
        let tag = self.bump().ok_or_else(|| self.error())?;
        let rendered = match tag {
            b'B' => "byte".to_string(),
            b'C' => "char".to_string(),
            b'D' => "double".to_string(),
            b'F' => "float".to_string(),
            b'I' => "int".to_string(),
            b'J' => "long".to_string(),
            b'S' => "short".to_string(),
            b'Z' => "boolean".to_string(),
            b'V' => "void".to_string(),
            b'[' => format!("{}[]", self.parse_type()?),
            b'L' => self.parse_class_type()?,
            b'T' => {
                let name = self.take_until(|b| b == b';');
                self.expect(b';')?;
                if name.is_empty() {
                    return Err(self.error());
                }
                name.to_string()
            }
            _ => return Err(self.error()),
        };
        Ok(rendered)
    }

    fn parse_class_type(&mut self) -> Result<String, ClassParseError> {
        let mut out = String::new();
        loop {
            let segment = self.take_until(|b| matches!(b, b';' | b'<' | b'.'));
            if segment.is_empty() {
                return Err(self.error());
            }
            out.push_str(&binary_name(segment));
            if self.peek() == Some(b'<') {
                out.push_str(&self.parse_type_arguments()?);
            }
            match self.bump() {
                Some(b';') => return Ok(out),
                Some(b'.') => out.push('$'),
                _ => return Err(self.error()),
            }
        }
    }

    fn parse_type_arguments(&mut self) -> Result<String, ClassParseError> {
        self.expect(b'<')?;
        let mut args = Vec::new();
        loop {
            let arg = match self.peek() {
                Some(b'>') => break,
                Some(b'*') => {
                    self.pos += 1;
                    "?".to_string()
                }
                Some(b'+') => {
                    self.pos += 1;
                    format!("? extends {}", self.parse_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    format!("? super {}", self.parse_type()?)
                }
                Some(_) => self.parse_type()?,
                None => return Err(self.error()),
            };
            args.push(arg);
        }
        self.expect(b'>')?;
        Ok(format!("<{}>", args.join(", ")))
    }

    fn skip_type_parameters(&mut self) -> Result<(), ClassParseError> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error()),
            }
            let name = self.take_until(|b| b == b':' || b == b'>');
            if name.is_empty() || self.peek() != Some(b':') {
                return Err(self.error());
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                    self.parse_type()?;
                }
            }
        }
        self.expect(b'>')
    }
}
