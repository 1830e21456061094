//! A small line-based textual stand-in for a real page-description source
//! (PDF content streams, CAD exports, ...): parses a plain-text script into pages of
//! [`Operator`]s, so the CLI and its tests have something to drive
//! [`SceneBuilder`](vscene_core::SceneBuilder) with without depending on a real PDF
//! parser, which is explicitly out of scope for this crate.
//!
//! Grammar (one directive per line, blank lines and `#` comments ignored):
//!
//! ```text
//! page <x0> <y0> <x1> <y1>
//! save
//! restore
//! cm <a> <b> <c> <d> <e> <f>
//! w <line_width>
//! stroke_color gray|rgb|cmyk <components...>
//! fill_color gray|rgb|cmyk <components...>
//! stroke_alpha <alpha>
//! fill_alpha <alpha>
//! path <paint>
//!   m <x> <y> | l <x> <y> | c <x1> <y1> <x2> <y2> <x3> <y3> | q <x1> <y1> <x2> <y2> | h
//! endpath
//! begin_text
//! text_matrix <a> <b> <c> <d> <e> <f>
//! define_glyph <id>
//!   m/l/c/q/h as above
//! end_glyph
//! show_glyphs <id>:<advance> ...
//! end_text
//! raster <width> <height> <a> <b> <c> <d> <e> <f>
//!   <hex rgba8 bytes, straight alpha, row-major>
//! endpage
//! ```

use anyhow::{bail, Context, Result};
use vscene_core::color::ColorInput;
use vscene_core::{Operator, PaintOp};

/// One parsed page: its bounds and the operator stream recorded for it.
pub struct ScriptPage {
    pub bounds: (f64, f64, f64, f64),
    pub operators: Vec<Operator>,
}

struct Lines<'a> {
    lines: std::vec::IntoIter<(usize, &'a str)>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
            .collect::<Vec<_>>()
            .into_iter();
        Self { lines }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.next()
    }
}

fn parse_paint(tok: &str) -> Result<PaintOp> {
    Ok(match tok {
        "stroke" => PaintOp::Stroke,
        "close_stroke" => PaintOp::CloseStroke,
        "fill" => PaintOp::Fill,
        "fill_even_odd" => PaintOp::FillEvenOdd,
        "fill_stroke" => PaintOp::FillStroke,
        "fill_even_odd_stroke" => PaintOp::FillEvenOddStroke,
        "close_fill_stroke" => PaintOp::CloseFillStroke,
        "close_fill_even_odd_stroke" => PaintOp::CloseFillEvenOddStroke,
        other => bail!("unknown paint mode '{other}'"),
    })
}

fn parse_f64(tok: &str, line_no: usize) -> Result<f64> {
    tok.parse::<f64>().with_context(|| format!("line {line_no}: invalid number '{tok}'"))
}

fn parse_color(tokens: &[&str], line_no: usize) -> Result<ColorInput> {
    match tokens {
        ["gray", v] => Ok(ColorInput::Gray(parse_f64(v, line_no)?)),
        ["rgb", r, g, b] => Ok(ColorInput::Rgb(parse_f64(r, line_no)?, parse_f64(g, line_no)?, parse_f64(b, line_no)?)),
        ["cmyk", c, m, y, k] => {
            Ok(ColorInput::Cmyk(parse_f64(c, line_no)?, parse_f64(m, line_no)?, parse_f64(y, line_no)?, parse_f64(k, line_no)?))
        }
        _ => bail!("line {line_no}: malformed color directive"),
    }
}

fn parse_matrix(tokens: &[&str], line_no: usize) -> Result<[f64; 6]> {
    if tokens.len() != 6 {
        bail!("line {line_no}: matrix directive needs 6 components, got {}", tokens.len());
    }
    let mut out = [0.0; 6];
    for (i, tok) in tokens.iter().enumerate() {
        out[i] = parse_f64(tok, line_no)?;
    }
    Ok(out)
}

/// Appends one packed path-data subcommand (§4.1 opcode scheme) for a segment line.
fn push_segment(tokens: &[&str], line_no: usize, data: &mut Vec<f64>) -> Result<()> {
    match tokens {
        ["m", x, y] => {
            data.push(0.0);
            data.push(parse_f64(x, line_no)?);
            data.push(parse_f64(y, line_no)?);
        }
        ["l", x, y] => {
            data.push(1.0);
            data.push(parse_f64(x, line_no)?);
            data.push(parse_f64(y, line_no)?);
        }
        ["c", x1, y1, x2, y2, x3, y3] => {
            data.push(2.0);
            for t in [x1, y1, x2, y2, x3, y3] {
                data.push(parse_f64(t, line_no)?);
            }
        }
        ["q", x1, y1, x2, y2] => {
            data.push(3.0);
            for t in [x1, y1, x2, y2] {
                data.push(parse_f64(t, line_no)?);
            }
        }
        ["h"] => data.push(4.0),
        _ => bail!("line {line_no}: unrecognized path segment"),
    }
    Ok(())
}

fn parse_hex_bytes(s: &str, line_no: usize) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        bail!("line {line_no}: hex byte string has odd length");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).with_context(|| format!("line {line_no}: invalid hex byte")))
        .collect()
}

/// Parses a complete script into its pages.
pub fn parse_script(text: &str) -> Result<Vec<ScriptPage>> {
    let mut lines = Lines::new(text);
    let mut pages = Vec::new();

    while let Some((line_no, line)) = lines.next_line() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let ["page", x0, y0, x1, y1] = tokens.as_slice() else {
            bail!("line {line_no}: expected 'page <x0> <y0> <x1> <y1>'");
        };
        let bounds = (parse_f64(x0, line_no)?, parse_f64(y0, line_no)?, parse_f64(x1, line_no)?, parse_f64(y1, line_no)?);
        let mut operators = Vec::new();

        loop {
            let Some((line_no, line)) = lines.next_line() else {
                bail!("unexpected end of script: missing 'endpage'");
            };
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["endpage"] => break,
                ["save"] => operators.push(Operator::Save),
                ["restore"] => operators.push(Operator::Restore),
                ["cm", rest @ ..] => operators.push(Operator::ConcatMatrix(parse_matrix(rest, line_no)?)),
                ["w", v] => operators.push(Operator::SetLineWidth(parse_f64(v, line_no)?)),
                ["stroke_color", rest @ ..] => operators.push(Operator::SetStrokeColor(parse_color(rest, line_no)?)),
                ["fill_color", rest @ ..] => operators.push(Operator::SetFillColor(parse_color(rest, line_no)?)),
                ["stroke_alpha", v] => operators.push(Operator::SetStrokeAlpha(parse_f64(v, line_no)?)),
                ["fill_alpha", v] => operators.push(Operator::SetFillAlpha(parse_f64(v, line_no)?)),
                ["path", paint] => {
                    let paint = parse_paint(paint)?;
                    let mut data = Vec::new();
                    loop {
                        let Some((seg_line_no, seg_line)) = lines.next_line() else {
                            bail!("unexpected end of script: missing 'endpath'");
                        };
                        let seg_tokens: Vec<&str> = seg_line.split_whitespace().collect();
                        if seg_tokens.as_slice() == ["endpath"] {
                            break;
                        }
                        push_segment(&seg_tokens, seg_line_no, &mut data)?;
                    }
                    operators.push(Operator::ConstructPath { paint, data });
                }
                ["begin_text"] => operators.push(Operator::BeginText),
                ["text_matrix", rest @ ..] => operators.push(Operator::SetTextMatrix(parse_matrix(rest, line_no)?)),
                ["define_glyph", id] => {
                    let id: u32 = id.parse().with_context(|| format!("line {line_no}: invalid glyph id"))?;
                    let mut segments = Vec::new();
                    loop {
                        let Some((seg_line_no, seg_line)) = lines.next_line() else {
                            bail!("unexpected end of script: missing 'end_glyph'");
                        };
                        let seg_tokens: Vec<&str> = seg_line.split_whitespace().collect();
                        if seg_tokens.as_slice() == ["end_glyph"] {
                            break;
                        }
                        push_segment(&seg_tokens, seg_line_no, &mut segments)?;
                    }
                    operators.push(Operator::DefineGlyph { id, segments });
                }
                ["show_glyphs", rest @ ..] => {
                    let mut glyph_ids = Vec::with_capacity(rest.len());
                    let mut advances = Vec::with_capacity(rest.len());
                    for tok in rest {
                        let (id, adv) = tok.split_once(':').with_context(|| format!("line {line_no}: expected 'id:advance'"))?;
                        glyph_ids.push(id.parse::<u32>().with_context(|| format!("line {line_no}: invalid glyph id"))?);
                        advances.push(parse_f64(adv, line_no)?);
                    }
                    operators.push(Operator::ShowGlyphs { glyph_ids, advances });
                }
                ["end_text"] => operators.push(Operator::EndText),
                ["raster", w, h, rest @ ..] => {
                    let width: u32 = w.parse().with_context(|| format!("line {line_no}: invalid raster width"))?;
                    let height: u32 = h.parse().with_context(|| format!("line {line_no}: invalid raster height"))?;
                    let matrix = parse_matrix(rest, line_no)?;
                    let Some((hex_line_no, hex_line)) = lines.next_line() else {
                        bail!("line {line_no}: raster directive missing its pixel data line");
                    };
                    let rgba8 = parse_hex_bytes(hex_line, hex_line_no)?;
                    let expected = width as usize * height as usize * 4;
                    if rgba8.len() != expected {
                        bail!("line {hex_line_no}: raster pixel data is {} bytes, expected {expected}", rgba8.len());
                    }
                    operators.push(Operator::DrawRaster { width, height, rgba8, matrix });
                }
                [] => unreachable!("blank lines are filtered out"),
                other => operators.push(Operator::Unknown(other.join(" "))),
            }
        }

        pages.push(ScriptPage { bounds, operators });
    }

    Ok(pages)
}
