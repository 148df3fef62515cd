use loopguard_core::{Error, Result};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::error::Error as SwcError;
use swc_ecma_parser::lexer::Lexer;
use swc_ecma_parser::{Parser, Syntax};
use swc_ecma_quote::swc_common::input::StringInput;
use swc_ecma_quote::swc_common::{sync::Lrc, FileName, SourceMap};

/// Parse a snippet into an owned syntax tree.
///
/// Scripts and modules are both accepted; empty or whitespace-only input
/// is a valid degenerate program. Any parser diagnostic, recovered or
/// fatal, is a hard `Error::Parse` so the tree is never a silent
/// mis-parse of the input.
pub fn parse(source: &str) -> Result<Program> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("<loopguard>".into()).into(),
        source.to_string(),
    );
    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        EsVersion::EsNext,
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    match parser.parse_program() {
        Ok(program) => {
            let errors = parser.take_errors();
            if errors.is_empty() {
                Ok(program)
            } else {
                Err(parse_error(&errors))
            }
        }
        Err(err) => {
            let mut errors = parser.take_errors();
            errors.push(err);
            Err(parse_error(&errors))
        }
    }
}

fn parse_error(errors: &[SwcError]) -> Error {
    let rendered = errors
        .iter()
        .map(|err| format!("{err:?}"))
        .collect::<Vec<_>>()
        .join("; ");
    Error::Parse(rendered)
}
