//! Render a parsed schema back as indented text, one declaration or member per line.

use crate::ast::*;
use std::fmt::Write as _;

pub fn render(schema: &Schema) -> String {
    let mut out = String::new();
    for decl in &schema.decls {
        match decl {
            Decl::Scalar(field) => field_line(&mut out, 0, field),
            Decl::Extern(e) => {
                let _ = writeln!(out, "extern {}", e.name.text);
            }
            Decl::Enum(e) => enum_decl(&mut out, e),
            Decl::Struct(s) => struct_decl(&mut out, 0, s),
            Decl::Select(s) => select_decl(&mut out, 0, s),
        }
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn bounds_text(bounds: Option<&Bounds>) -> String {
    match bounds {
        None => String::new(),
        Some(Bounds::Fixed(size)) => format!("[{}]", size),
        Some(Bounds::Range { lo, hi }) => format!("<{}..{}>", lo, hi),
    }
}

fn field_line(out: &mut String, depth: usize, field: &Field) {
    indent(out, depth);
    let _ = writeln!(
        out,
        "{} {}{}",
        field.ty,
        field.name.text,
        bounds_text(field.bounds.as_ref())
    );
}

fn enum_decl(out: &mut String, decl: &EnumDecl) {
    let mut entries: Vec<String> = decl
        .entries
        .iter()
        .map(|e| match &e.value {
            Some(v) => format!("{}({})", e.name.text, v.token.text),
            None => e.name.text.clone(),
        })
        .collect();
    if let Some(max) = &decl.max {
        entries.push(format!("({})", max.token.text));
    }
    let _ = writeln!(out, "enum {} {{ {} }}", decl.name.text, entries.join(", "));
}

fn struct_decl(out: &mut String, depth: usize, decl: &StructDecl) {
    indent(out, depth);
    let _ = writeln!(out, "struct {}", decl.name.text);
    for member in &decl.members {
        match member {
            Member::Field(field) => field_line(out, depth + 1, field),
            Member::Struct(inner) => struct_decl(out, depth + 1, inner),
            Member::Select(select) => select_decl(out, depth + 1, select),
        }
    }
}

fn select_decl(out: &mut String, depth: usize, decl: &SelectDecl) {
    indent(out, depth);
    match &decl.name {
        Some(name) => {
            let _ = writeln!(out, "select {} ({})", name.text, decl.selector);
        }
        None => {
            let _ = writeln!(out, "select ({})", decl.selector);
        }
    }
    for case in &decl.cases {
        indent(out, depth + 1);
        let labels: Vec<&str> = case.labels.iter().map(|l| l.name.text.as_str()).collect();
        let _ = write!(out, "case {}:", labels.join(", "));
        if case.body.is_empty() {
            out.push_str(" ;");
        }
        for item in &case.body {
            out.push(' ');
            if item.signed {
                out.push_str("digitally-signed ");
            }
            let _ = write!(out, "{}", item.ty);
            if let Some(name) = &item.name {
                let _ = write!(out, " {}{}", name.text, bounds_text(item.bounds.as_ref()));
            }
            out.push(';');
        }
        out.push('\n');
    }
}
