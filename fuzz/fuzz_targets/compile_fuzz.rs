//! Compile fuzz target: feed arbitrary text through lexer, parser and analyzer.
//! Compilation must not panic and every diagnostic must carry a line of at least 1.
//! Build with: cargo fuzz run compile_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let compilation = wireschema::compile(s, &wireschema::CompileOptions::default());
    assert!(compilation.diagnostics.iter().all(|d| d.line >= 1));
    let _ = compilation.render();
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run compile_fuzz");
}
