//! Module containing error definitions for the lexing, parsing, and
//! evaluation process, plus traceback/arrow-snippet rendering.
//!
//! Mirrors the teacher crate's `EvalAltResult`: control-flow signals
//! (`Return`/`Break`/`Continue`) and genuine errors live in one enum, since
//! the evaluator's sole signalling channel is `Result<Value, Box<LunfardoError>>`.

use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::token::Position;
use crate::value::Value;

/// Errors raised while scanning source text.
#[derive(Debug, Clone)]
pub enum LexError {
    IllegalChar(String, Position),
    ExpectedChar(String, Position),
}

/// Errors raised while parsing a token stream.
#[derive(Debug, Clone)]
pub enum ParseErrorType {
    InvalidSyntax(String, Position),
}

/// The sole signalling channel threaded through the evaluator.
///
/// `Return`/`LoopBreak`/`LoopContinue` are not "errors" in the user sense;
/// they are short-circuit signals consumed by the nearest enclosing
/// function/loop, exactly like the teacher's `EvalAltResult::Return` and
/// `EvalAltResult::LoopBreak`.
#[derive(Debug)]
pub enum LunfardoError {
    Lex(LexError),
    Parse(ParseErrorType),

    InvalidType(String, Position, Position, Rc<Context>),
    InvalidIndex(String, Position, Position, Rc<Context>),
    InvalidKey(String, Position, Position, Rc<Context>),
    InvalidValue(String, Position, Position, Rc<Context>),
    UndefinedVar(String, Position, Position, Rc<Context>),
    ZeroDivision(String, Position, Position, Rc<Context>),
    MaxRecursion(Position, Position, Rc<Context>),
    AttributeError(String, Position, Position, Rc<Context>),
    FileNotFound(String, Position, Position, Rc<Context>),

    /// Control flow: `return`.
    Return(Value),
    /// Control flow: `break`.
    LoopBreak,
    /// Control flow: `continue`.
    LoopContinue,
}

impl LunfardoError {
    /// The tag name a `proba ... sibardea <tag>` clause matches against.
    /// `None` for lex/parse errors and control-flow signals, which `proba`
    /// never intercepts.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Lex(LexError::IllegalChar(..)) => Some("caracter_ilegal"),
            Self::Lex(LexError::ExpectedChar(..)) => Some("caracter_esperado"),
            Self::Parse(ParseErrorType::InvalidSyntax(..)) => Some("sintaxis_invalida"),
            Self::InvalidType(..) => Some("bardo_de_tipo"),
            Self::InvalidIndex(..) => Some("bardo_de_indice"),
            Self::InvalidKey(..) => Some("bardo_de_clave"),
            Self::InvalidValue(..) => Some("bardo_de_valor"),
            Self::UndefinedVar(..) => Some("variable_indefinida"),
            Self::ZeroDivision(..) => Some("division_por_cero"),
            Self::MaxRecursion(..) => Some("limite_de_recursion"),
            Self::AttributeError(..) => Some("bardo_de_atributo"),
            Self::FileNotFound(..) => Some("archivo_no_encontrado"),
            Self::Return(_) | Self::LoopBreak | Self::LoopContinue => None,
        }
    }

    /// Construct the error variant named by a `bardea <tag> <msg>` raise,
    /// or `None` if `tag` isn't a recognized error tag.
    pub fn from_tag(tag: &str, message: String, pos_start: Position, pos_end: Position, context: Rc<Context>) -> Option<Self> {
        Some(match tag {
            "bardo_de_tipo" => Self::InvalidType(message, pos_start, pos_end, context),
            "bardo_de_indice" => Self::InvalidIndex(message, pos_start, pos_end, context),
            "bardo_de_clave" => Self::InvalidKey(message, pos_start, pos_end, context),
            "bardo_de_valor" => Self::InvalidValue(message, pos_start, pos_end, context),
            "bardo_de_atributo" => Self::AttributeError(message, pos_start, pos_end, context),
            "variable_indefinida" => Self::UndefinedVar(message, pos_start, pos_end, context),
            "division_por_cero" => Self::ZeroDivision(message, pos_start, pos_end, context),
            "archivo_no_encontrado" => Self::FileNotFound(message, pos_start, pos_end, context),
            _ => return None,
        })
    }

    fn header(&self) -> (&'static str, String) {
        match self {
            Self::Lex(LexError::IllegalChar(d, _)) => ("Carácter ilegal", d.clone()),
            Self::Lex(LexError::ExpectedChar(d, _)) => ("Carácter esperado", d.clone()),
            Self::Parse(ParseErrorType::InvalidSyntax(d, _)) => ("Sintaxis inválida", d.clone()),
            Self::InvalidType(d, ..) => ("Bardo de tipo", d.clone()),
            Self::InvalidIndex(d, ..) => ("Bardo de índice", d.clone()),
            Self::InvalidKey(d, ..) => ("Bardo de clave", d.clone()),
            Self::InvalidValue(d, ..) => ("Bardo de valor", d.clone()),
            Self::UndefinedVar(d, ..) => ("Variable indefinida", d.clone()),
            Self::ZeroDivision(d, ..) => ("División por cero", d.clone()),
            Self::MaxRecursion(..) => ("Límite de recursión", "se superó la profundidad máxima de llamadas".into()),
            Self::AttributeError(d, ..) => ("Bardo de atributo", d.clone()),
            Self::FileNotFound(d, ..) => ("Archivo no encontrado", d.clone()),
            Self::Return(_) | Self::LoopBreak | Self::LoopContinue => {
                ("", "control de flujo fuera de lugar".into())
            }
        }
    }

    fn positions(&self) -> Option<(&Position, &Position)> {
        match self {
            Self::Lex(LexError::IllegalChar(_, p)) | Self::Lex(LexError::ExpectedChar(_, p)) => Some((p, p)),
            Self::Parse(ParseErrorType::InvalidSyntax(_, p)) => Some((p, p)),
            Self::InvalidType(_, s, e, _)
            | Self::InvalidIndex(_, s, e, _)
            | Self::InvalidKey(_, s, e, _)
            | Self::InvalidValue(_, s, e, _)
            | Self::UndefinedVar(_, s, e, _)
            | Self::ZeroDivision(_, s, e, _)
            | Self::AttributeError(_, s, e, _)
            | Self::FileNotFound(_, s, e, _) => Some((s, e)),
            Self::MaxRecursion(s, e, _) => Some((s, e)),
            Self::Return(_) | Self::LoopBreak | Self::LoopContinue => None,
        }
    }

    fn context(&self) -> Option<&Rc<Context>> {
        match self {
            Self::InvalidType(_, _, _, c)
            | Self::InvalidIndex(_, _, _, c)
            | Self::InvalidKey(_, _, _, c)
            | Self::InvalidValue(_, _, _, c)
            | Self::UndefinedVar(_, _, _, c)
            | Self::ZeroDivision(_, _, _, c)
            | Self::AttributeError(_, _, _, c)
            | Self::FileNotFound(_, _, _, c)
            | Self::MaxRecursion(_, _, c) => Some(c),
            _ => None,
        }
    }

    /// Render the full user-facing message: traceback (for runtime errors),
    /// header + details, and an arrow-pointing source snippet.
    pub fn render(&self) -> String {
        let (name, details) = self.header();
        let mut out = String::new();

        if let Some(ctx) = self.context() {
            out.push_str(&generate_traceback(ctx, self.positions().map(|(s, _)| s)));
        }

        if !name.is_empty() {
            out.push_str(&format!("{}: {}", name, details));
        } else {
            out.push_str(&details);
        }

        if let Some((start, end)) = self.positions() {
            out.push('\n');
            out.push_str(&format!("Fichero {}, linea {}", start.filename, start.line + 1));
            out.push('\n');
            out.push_str(&string_with_arrows(&start.source, start, end));
        }

        out
    }
}

impl fmt::Display for LunfardoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl std::error::Error for LunfardoError {}

/// Walk the context chain from outermost to innermost ("the most recent
/// call is last"), printing one `Fichero <fn>, línea N, en <display_name>`
/// line per frame.
fn generate_traceback(innermost: &Rc<Context>, innermost_pos: Option<&Position>) -> String {
    let mut frames = Vec::new();
    let mut ctx = Some(innermost.clone());
    let mut pos = innermost_pos.cloned();

    while let Some(c) = ctx {
        if let Some(p) = &pos {
            frames.push(format!("  Fichero {}, línea {}, en {}", p.filename, p.line + 1, c.display_name));
        }
        pos = c.entry_pos.clone();
        ctx = c.parent.clone();
    }

    if frames.is_empty() {
        return String::new();
    }

    frames.reverse();
    let mut out = String::from("Seguimiento del quilombo (la llamada más reciente está última):\n");
    out.push_str(&frames.join("\n"));
    out.push('\n');
    out
}

/// Render a single-line arrow snippet pointing at `[pos_start, pos_end)`.
pub fn string_with_arrows(text: &str, pos_start: &Position, pos_end: &Position) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let line_idx = pos_start.line as usize;
    let line = lines.get(line_idx).copied().unwrap_or("");

    let col_start = pos_start.col as usize;
    let col_end = if pos_end.line == pos_start.line {
        (pos_end.col as usize).max(col_start + 1)
    } else {
        line.len().max(col_start + 1)
    };

    let mut arrows = String::new();
    for _ in 0..col_start {
        arrows.push(' ');
    }
    for _ in col_start..col_end {
        arrows.push('^');
    }

    format!("{}\n{}", line, arrows)
}
