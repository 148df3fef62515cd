use loopguard_core::{Error, Result};
use swc_ecma_ast::Program;
use swc_ecma_codegen::text_writer::JsWriter;
use swc_ecma_codegen::Emitter;
use swc_ecma_quote::swc_common::{sync::Lrc, SourceMap};

/// Serialize the (possibly mutated) tree back to source text.
///
/// The emitter re-formats the whole snippet; semantics beyond the guard
/// insertions and body-to-block normalization are untouched.
pub fn generate(program: &Program) -> Result<String> {
    let cm: Lrc<SourceMap> = Default::default();
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        match program {
            Program::Module(module) => emitter.emit_module(module)?,
            Program::Script(script) => emitter.emit_script(script)?,
        }
    }
    String::from_utf8(buf).map_err(|err| Error::Generation(err.to_string()))
}
