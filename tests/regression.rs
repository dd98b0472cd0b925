//! Diagnostic output regression suite: each case compiles a fixed source and compares
//! the rendered diagnostics byte for byte.

use pretty_assertions::assert_eq;
use wireschema::{compile, CompileOptions};

const LABEL: &str = "test-in";

fn check(src: &str, expected: &str) {
    let compilation = compile(src, &CompileOptions::labelled(LABEL));
    let expected = expected.replace("INFILE", LABEL);
    assert_eq!(compilation.render(), expected, "source:\n{}", src);
    assert_eq!(compilation.is_ok(), expected.is_empty());
}

// ==================== Lexical and syntax ====================

#[test]
fn empty_input() {
    check("", "INFILE:1: error near ``'': syntax error, unexpected $end\n");
}

#[test]
fn unterminated_block_comment() {
    check("uint8 f; /* comment", "INFILE:1: error near ``'': EOF in comment\n");
}

#[test]
fn block_opener_inside_line_comment() {
    check("uint8 f; // /* comment", "");
}

#[test]
fn line_comment_then_declarations() {
    check(
        "// comment
    uint8 foo;
    struct {foo bar;} baz;",
        "",
    );
}

#[test]
fn enum_entry_missing_value() {
    check(
        "enum { a(1), b } c;",
        "INFILE:1: error near ``}'': syntax error, unexpected '}', expecting '('\n",
    );
}

#[test]
fn enum_trailing_comma_after_valueless_entry() {
    check(
        "enum { a(1), b, } c;",
        "INFILE:1: error near ``,'': syntax error, unexpected ',', expecting '('\n",
    );
}

#[test]
fn scalar_after_signed_clause() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: case b: case c: digitally-signed extensions ; uint8 spacer;
    } s;",
        "INFILE:3: error near ``uint8'': syntax error, unexpected tUINT8, expecting tCASE or '}'\n",
    );
}

#[test]
fn nested_select_in_case_body() {
    check(
        "uint8 f; struct {} empty;
    select (f) {
    case false:
        select (f) {
            case false: ;
        }
    }",
        "INFILE:4: error near ``select'': syntax error, unexpected tSELECT\n",
    );
}

#[test]
fn deeply_nested_unterminated_comment() {
    check(&"/*".repeat(50_000), "INFILE:1: error near ``'': EOF in comment\n");
}

#[test]
fn nesting_limit() {
    check(
        &"struct {".repeat(50_000),
        "INFILE:1: error near ``struct'': syntax error, nesting deeper than 256\n",
    );
}

// ==================== Sizes and ranges ====================

#[test]
fn duplicate_global_symbol() {
    check(
        "uint8 f; uint8 f;\n",
        "INFILE:1: error near ``;'': Duplicate symbol ``f'' found\n",
    );
}

#[test]
fn inverted_range() {
    check(
        "uint16 f<10..1>;\n",
        "INFILE:1: error near ``;'': ``f'' range 10 less than 1\n",
    );
}

#[test]
fn zero_size() {
    check(
        "uint16 f[0];\n",
        "INFILE:1: error near ``;'': ``f'' size (0) is not positive\n",
    );
}

#[test]
fn exponent_out_of_range_cascades() {
    check(
        "uint16 f[2^33-1];\n",
        "INFILE:1: error near ``2^33-1'': Exponent out of range\n\
         INFILE:1: error near ``;'': ``f'' size (0) is not positive\n",
    );
}

#[test]
fn bad_exponent_cascades() {
    check(
        "uint16 f[2^3-1];\n",
        "INFILE:1: error near ``2^3-1'': Bad exponent\n\
         INFILE:1: error near ``;'': ``f'' size (0) is not positive\n",
    );
    check(
        "uint16 f[2^3-2];\n",
        "INFILE:1: error near ``2^3-2'': Bad exponent\n\
         INFILE:1: error near ``;'': ``f'' size (0) is not positive\n",
    );
}

#[test]
fn oversized_literals() {
    check(
        "uint8 f[99999999999999999999999];\n",
        "INFILE:1: error near ``99999999999999999999999'': Number out of range\n\
         INFILE:1: error near ``;'': ``f'' size (0) is not positive\n",
    );
    check(
        "enum { a(99999999999999999999999), b(7), (5) } e;\n",
        "INFILE:1: error near ``99999999999999999999999'': Number out of range\n\
         INFILE:1: error near ``;'': Value for ``b'' is too big (7 > 5)\n",
    );
}

#[test]
fn size_reference_to_non_value() {
    check(
        "struct { } s;
    opaque x[s];",
        "INFILE:2: error near ``;'': Unknown size reference ``s''\n",
    );
}

#[test]
fn unknown_size_reference() {
    check(
        "extern f;
    uint32 g[f];
    uint32 gg[ff];",
        "INFILE:3: error near ``;'': Unknown size reference ``ff''\n",
    );
}

#[test]
fn dotted_size_reference_inside_struct() {
    check(
        "struct {
        uint8 size;
        opaque g[s.size];
       } s;",
        "INFILE:3: error near ``;'': Unknown size reference ``s.size''\n\
         INFILE:3: error near ``;'': Note: cannot resolve dotted items.\n",
    );
}

#[test]
fn dotted_note_printed_once() {
    check(
        "struct {
        uint8 size;
       } s;
       opaque g[s.size];
       opaque h[s.size];",
        "INFILE:4: error near ``;'': Unknown size reference ``s.size''\n\
         INFILE:4: error near ``;'': Note: cannot resolve dotted items.\n\
         INFILE:5: error near ``;'': Unknown size reference ``s.size''\n",
    );
}

// ==================== Enums ====================

#[test]
fn duplicate_enum_entry() {
    check(
        "enum { a, a } b;\n",
        "INFILE:1: error near ``a'': Duplicate ``a'' in enum\n",
    );
}

#[test]
fn enum_values_too_big_and_duplicated() {
    check(
        "enum { a(20), b(20), (12) } d; ",
        "INFILE:1: error near ``;'': Value for ``a'' is too big (20 > 12)\n\
         INFILE:1: error near ``;'': Enum ``b'' duplicates value 20\n\
         INFILE:1: error near ``;'': Value for ``b'' is too big (20 > 12)\n",
    );
}

// ==================== Selects ====================

#[test]
fn unknown_variant_selector() {
    check(
        "select (f) { case a: ; } f;",
        "INFILE:1: error near ``{'': Unknown variant selector ``f''\n",
    );
}

#[test]
fn struct_selector() {
    check(
        "struct { } s;
    select (s) { case a: ; } t;",
        "INFILE:2: error near ``{'': Unknown variant selector ``s''\n",
    );
}

#[test]
fn extern_selector() {
    check(
        "extern f;
    select (f) { case a: ; } g;",
        "",
    );
}

#[test]
fn duplicate_case_within_group() {
    check(
        "enum { true, false } bool;
    select (bool) {
      case a: case a: ;
    } g;",
        "INFILE:3: error near ``:'': Duplicate case ``a''\n",
    );
}

#[test]
fn signed_clause_then_empty_case() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: case b: case c: digitally-signed extensions;
    case d: ;
    } s;",
        "",
    );
}

#[test]
fn duplicate_case_across_groups() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: case b: case c: digitally-signed extensions;
    case a: ;
    } s;",
        "INFILE:5: error near ``;'': Duplicate case ``a'' in ``s''\n",
    );
}

#[test]
fn duplicate_case_before_signed_clause() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: case b: case b: digitally-signed extensions;
    } s;",
        "INFILE:3: error near ``:'': Duplicate case ``b''\n",
    );
}

#[test]
fn signed_clause_followed_by_named_reference() {
    check(
        "extern f; extern extensions; extern d;
    select (f) {
    case a: case b: case c:
       digitally-signed extensions;
       d e;
    } s;",
        "",
    );
}

#[test]
fn anonymous_case_reference() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: digitally-signed extensions ;
    case b: f;
    } s;",
        "",
    );
}

#[test]
fn named_case_reference() {
    check(
        "extern f; extern extensions;
    select (f) {
    case a: digitally-signed extensions ;
    case b: f field;
    } s;",
        "",
    );
}

#[test]
fn unknown_case_member_type() {
    check(
        "extern f; extern extensions;
    select (f) {
    case c: f2 field;
    } s;",
        "INFILE:4: error near ``}'': Unknown member type ``f2''\n",
    );
}

#[test]
fn dotted_selector_in_struct() {
    check(
        "struct {
        select (b.x) {
            case foo: ;
        } n;
        uint32 x;
    } b;",
        "INFILE:2: error near ``{'': Unknown variant selector ``b.x''\n\
         INFILE:2: error near ``{'': Note: cannot resolve dotted items.\n",
    );
}

// ==================== Externs and structs ====================

#[test]
fn extern_and_scalar_share_name() {
    check("uint8 f; extern f;", "");
    check("extern f; uint8 f;", "");
}

#[test]
fn duplicate_extern() {
    check(
        "extern f;
    uint8 f;
    extern f;",
        "INFILE:3: error near ``;'': Duplicate symbol ``f'' found\n",
    );
}

#[test]
fn duplicate_struct_item() {
    check(
        "struct { uint8 f; uint8 f; } s;",
        "INFILE:1: error near ``;'': Duplicate item ``f'' in ``s''\n",
    );
}

#[test]
fn extern_member_type() {
    check(
        "extern ZZ;
    struct { uint8 f; ZZ g; } s;",
        "",
    );
}

#[test]
fn unknown_struct_member_type() {
    check(
        "struct { uint8 f; mytype g; } s;",
        "INFILE:1: error near ``;'': Unknown member type ``mytype''\n",
    );
}

#[test]
fn empty_struct() {
    check("struct { } empty;", "");
}

#[test]
fn client_hello() {
    check(
        "extern Extension; extern extensions_present;
    uint8 ProtocolVersion; opaque Random[12]; opaque SessionID[2^8-1];
    struct {
          ProtocolVersion client_version;
          Random random;
          SessionID session_id;
          select (extensions_present) {
              case false:
                  ;
              case true:
                  Extension extensions<0..2^16-1>;
          };
      } ClientHello;",
        "",
    );
}

#[test]
fn nested_struct_member_names_are_scoped() {
    check(
        "struct {
        struct {
            uint16 x[2];
        } n;
        uint32 x;
    } b;",
        "",
    );
}

#[test]
fn nested_struct_uses_earlier_struct_type() {
    check(
        "struct { uint8 f[12]; } x;
    struct {
        struct {
            x nested[2];
        } n;
        uint32 x;
    } b;",
        "",
    );
}

#[test]
fn nested_struct_unknown_member_type() {
    check(
        "struct {
        struct {
            foo nested[2];
        } n;
        uint32 x;
    } b;",
        "INFILE:4: error near ``;'': Unknown member type ``foo''\n",
    );
}

#[test]
fn output_is_deterministic() {
    let src = "enum { a(20), b(20), (12) } d; uint16 f[2^33-1]; opaque g[s.size];";
    let options = CompileOptions::labelled(LABEL);
    assert_eq!(compile(src, &options).render(), compile(src, &options).render());
}
