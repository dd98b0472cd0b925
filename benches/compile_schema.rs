//! Benchmark: lex, parse and analyze a handshake-sized schema, clean and with
//! a diagnostic in every declaration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wireschema::{compile, lexer, parser, CompileOptions};

const HANDSHAKE: &str = r#"
extern Extension; extern extensions_present;
uint8 ProtocolVersion; opaque Random[32]; opaque SessionID<0..2^8-1>;
uint16 CipherSuite; uint8 CompressionMethod;
enum { client_hello(1), server_hello(2), certificate(11), finished(20), (255) } HandshakeType;
struct {
    ProtocolVersion client_version;
    Random random;
    SessionID session_id;
    CipherSuite cipher_suites<2..2^16-1>;
    CompressionMethod compression_methods<1..2^8-1>;
    select (extensions_present) {
        case false: ;
        case true: Extension extensions<0..2^16-1>;
    };
} ClientHello;
struct {
    ProtocolVersion server_version;
    Random random;
    SessionID session_id;
    CipherSuite cipher_suite;
} ServerHello;
struct {
    HandshakeType msg_type;
    uint24 length;
    select (msg_type) {
        case client_hello: ClientHello body;
        case server_hello: ServerHello body;
        case certificate: case finished: digitally-signed Extension;
    } body;
} Handshake;
"#;

fn noisy_schema(copies: usize) -> String {
    let mut src = String::new();
    for i in 0..copies {
        src.push_str(&format!(
            "uint16 f{i}[2^33-1]; enum {{ a(20), b(20), (12) }} e{i}; \
             struct {{ uint8 x; uint8 x; missing y; opaque z[s.size]; }} s{i};\n"
        ));
    }
    src
}

fn bench_compile(c: &mut Criterion) {
    let options = CompileOptions::default();
    let tokens = lexer::tokenize(HANDSHAKE).expect("tokenize");
    let noisy = noisy_schema(64);
    eprintln!(
        "compile_schema: {} tokens, {} noisy diagnostics",
        tokens.len(),
        compile(&noisy, &options).diagnostics.len()
    );

    c.bench_function("tokenize_handshake", |b| {
        b.iter(|| lexer::tokenize(black_box(HANDSHAKE)).map(|t| t.len()))
    });

    c.bench_function("parse_handshake", |b| {
        b.iter(|| parser::parse(black_box(&tokens)).schema.decls.len())
    });

    c.bench_function("compile_handshake", |b| {
        b.iter(|| compile(black_box(HANDSHAKE), &options).is_ok())
    });

    c.bench_function("compile_noisy", |b| {
        b.iter(|| compile(black_box(&noisy), &options).diagnostics.len())
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
